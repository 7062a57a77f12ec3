use exchange_economy::pareto::{
    market_maker_restricted, market_maker_unrestricted, pareto_improvements,
    price_setter_continuous, price_setter_on_grid, utilitarian_planner, Outcome,
};
use exchange_economy::scenarios::{random_endowment_equilibria, DEFAULT_DRAWS, DEFAULT_SEED};
use exchange_economy::{default_solver, Agent, ExchangeEconomy, ExchangeParams, DEFAULT_PRICE_GRID};

fn print_outcome(label: &str, outcome: &Outcome) {
    let price = outcome
        .p1
        .map(|p| format!("{:.4}", p))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<28} {:>8} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
        label,
        price,
        outcome.a.x1,
        outcome.a.x2,
        outcome.utility_a,
        outcome.utility_b,
        outcome.aggregate_utility()
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("========================================");
    println!("Two-Agent Exchange Economy");
    println!("========================================");

    let params = ExchangeParams::default();
    let economy = ExchangeEconomy::new(params.clone())?;
    println!(
        "\nalpha = {:.4}, beta = {:.4}, omega_A = ({:.2}, {:.2})",
        params.alpha, params.beta, params.w1a, params.w2a
    );

    let solver = default_solver();
    let equilibrium = economy.solve_equilibrium(&solver)?;
    let p1 = equilibrium.prices.get(0);
    println!("\nWalrasian equilibrium");
    println!("  p1 = {:.6} (closed form {:.6})", p1, economy.analytical_price());
    println!(
        "  x_A = ({:.4}, {:.4}), x_B = ({:.4}, {:.4})",
        equilibrium.outcome.a.x1,
        equilibrium.outcome.a.x2,
        equilibrium.outcome.b.x1,
        equilibrium.outcome.b.x2
    );
    println!(
        "  excess demand = ({:.2e}, {:.2e}), Walras sum = {:.2e}",
        equilibrium.excess_demand[0],
        equilibrium.excess_demand[1],
        equilibrium.walras_sum()
    );

    println!("\nMarket clearing errors on the price grid (every 15th point)");
    println!("{:>8} {:>12} {:>12}", "p1", "eps1", "eps2");
    for (p, e1, e2) in economy
        .clearing_errors_on_grid(&DEFAULT_PRICE_GRID)?
        .into_iter()
        .step_by(15)
    {
        println!("{:>8.4} {:>12.6} {:>12.6}", p, e1, e2);
    }

    let improvements = pareto_improvements(&economy, 75);
    println!(
        "\nPareto improvements on the endowment: {} of {} grid allocations",
        improvements.len(),
        76 * 76
    );

    println!("\nAllocation mechanisms");
    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Mechanism", "p1", "x1A", "x2A", "uA", "uB", "uA+uB"
    );
    println!("{:-<28} {:->8} {:->8} {:->8} {:->8} {:->8} {:->8}", "", "", "", "", "", "", "");
    let walras = Outcome {
        p1: Some(p1),
        a: equilibrium.outcome.a,
        utility_a: economy.utility(Agent::A, equilibrium.outcome.a),
        utility_b: economy.utility(Agent::B, equilibrium.outcome.b),
    };
    print_outcome("Walrasian", &walras);
    print_outcome("A sets price (grid)", &price_setter_on_grid(&economy, &DEFAULT_PRICE_GRID)?);
    print_outcome("A sets price (continuous)", &price_setter_continuous(&economy, 1e-4, 10.0)?);
    if let Some(outcome) = market_maker_restricted(&economy, 75) {
        print_outcome("A market maker (in C)", &outcome);
    }
    print_outcome("A market maker (free)", &market_maker_unrestricted(&economy)?);
    print_outcome("Utilitarian planner", &utilitarian_planner(&economy)?);

    let draws = random_endowment_equilibria(&params, DEFAULT_DRAWS, DEFAULT_SEED, &solver)?;
    let prices: Vec<f64> = draws.iter().map(|d| d.equilibrium.prices.get(0)).collect();
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "\nRandom endowments (n = {}, seed = {}): p1 mean {:.4}, range [{:.4}, {:.4}]",
        draws.len(),
        DEFAULT_SEED,
        mean,
        min,
        max
    );

    Ok(())
}
