use production_economy::taxation::welfare_of;
use production_economy::{
    default_solver, default_tax_grid, optimal_tax, tax_sweep, ModelParams, ProductionEconomy,
};
use solvers::GridConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("========================================");
    println!("Production Economy with a Tax on Good 2");
    println!("========================================");

    let params = ModelParams::default();
    let solver = default_solver();
    let economy = ProductionEconomy::new(params.clone())?;

    println!("\nCoarse clearing check (|error| < 0.05 in all three markets)");
    for check in economy.check_market_clearing_grid(&GridConfig::new(0.1, 2.0, 20), 0.05)? {
        println!(
            "  p1 = {:.2}, p2 = {:.2}: labour {:+.4}, good 1 {:+.4}, good 2 {:+.4}",
            check.p1, check.p2, check.errors[0], check.errors[1], check.errors[2]
        );
    }

    let equilibrium = economy.solve_equilibrium(&solver)?;
    let outcome = &equilibrium.outcome;
    println!("\nEquilibrium without tax ({} Newton iterations)", equilibrium.iterations);
    println!("  p1 = {:.6}, p2 = {:.6}, w = 1", outcome.p1, outcome.p2);
    println!(
        "  labour {:.4} (firm 1 {:.4}, firm 2 {:.4})",
        outcome.consumer.labor, outcome.firm1.labor, outcome.firm2.labor
    );
    println!(
        "  y1 = {:.4}, y2 = {:.4}, c1 = {:.4}, c2 = {:.4}",
        outcome.firm1.output, outcome.firm2.output, outcome.consumer.c1, outcome.consumer.c2
    );
    println!(
        "  residual {:.2e}, Walras sum {:.2e}, welfare {:.6}",
        equilibrium.residual,
        equilibrium.walras_sum(),
        welfare_of(outcome, &params)
    );

    println!("\nTax sweep");
    println!(
        "{:>6} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "tau", "p1", "p2", "T", "y2", "SWF"
    );
    println!("{:->6} {:->8} {:->8} {:->8} {:->8} {:->10}", "", "", "", "", "", "");
    for point in tax_sweep(&params, &default_tax_grid(), &solver).iter().step_by(2) {
        match (&point.outcome, point.welfare) {
            (Some(o), Some(w)) => println!(
                "{:>6.2} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>10.6}",
                point.tau, o.p1, o.p2, o.transfer, o.firm2.output, w
            ),
            _ => println!("{:>6.2} {:>8}", point.tau, "failed"),
        }
    }

    let optimum = optimal_tax(&params, 0.0, 1.0, &solver)?;
    println!("\nOptimal tax (kappa = {})", params.kappa);
    println!("  tau* = {:.4}", optimum.tau);
    println!("  T*   = {:.4}", optimum.transfer);
    println!("  SWF* = {:.6}", optimum.welfare);
    println!(
        "  {} trials, {} failed",
        optimum.evaluations, optimum.failed_trials
    );

    Ok(())
}
