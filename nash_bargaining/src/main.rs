use nash_bargaining::{analytical_wage, numerical_wage, wage_by_weight, BargainingParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("========================================");
    println!("Nash Bargaining over a Wage");
    println!("========================================");

    let params = BargainingParams::default();
    println!(
        "\ntheta = {}, d1 = {}, d2 = {}, alpha = {:.4}",
        params.theta, params.d1, params.d2, params.alpha
    );

    let exact = analytical_wage(&params)?;
    let numeric = numerical_wage(&params)?;
    println!("\n{:<12} {:>12} {:>12} {:>12}", "Method", "Wage", "Worker", "Firm");
    println!("{:-<12} {:->12} {:->12} {:->12}", "", "", "", "");
    for (label, agreement) in [("Analytical", exact), ("Numerical", numeric)] {
        println!(
            "{:<12} {:>12.6} {:>12.6} {:>12.6}",
            label, agreement.wage, agreement.worker_gain, agreement.firm_gain
        );
    }
    println!("\n|difference| = {:.2e}", (exact.wage - numeric.wage).abs());

    println!("\nWage by bargaining weight");
    for (alpha, wage) in wage_by_weight(&params, &[0.1, 0.25, 0.5, 0.75, 0.9])? {
        println!("  alpha = {:.2}: w* = {:.4}", alpha, wage);
    }

    Ok(())
}
