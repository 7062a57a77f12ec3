use approx::assert_abs_diff_eq;
use production_economy::taxation::welfare_at;
use production_economy::{
    default_solver, optimal_tax, social_welfare, ModelParams, ProductionEconomy,
};
use solvers::{Backend, SolverError};

fn solve(tau: f64) -> solvers::EquilibriumResult<production_economy::MarketOutcome> {
    ProductionEconomy::new(ModelParams::default().with_tax(tau))
        .unwrap()
        .solve_equilibrium(&default_solver())
        .unwrap()
}

#[test]
fn untaxed_equilibrium_matches_closed_form() {
    // With γ = 0.5, A = 1, ν = 1, ε = 2 income solves I³ = 4,
    // p1 = √(0.6·I) and p2 = √(1.4·I).
    let result = solve(0.0);
    let income = 4.0_f64.cbrt();

    assert_eq!(result.backend, Backend::Newton);
    assert!(result.residual <= 1e-7, "residual {}", result.residual);
    assert_abs_diff_eq!(result.outcome.p1, (0.6 * income).sqrt(), epsilon = 1e-5);
    assert_abs_diff_eq!(result.outcome.p2, (1.4 * income).sqrt(), epsilon = 1e-5);
    assert_abs_diff_eq!(result.outcome.consumer.labor, income / 2.0, epsilon = 1e-5);
}

#[test]
fn every_market_clears_and_walras_law_holds() {
    for tau in [0.0, 0.25, 0.8] {
        let result = solve(tau);
        assert!(result.walras_sum().abs() < 1e-6, "tau {tau}");
        // The dropped labour market clears too.
        assert!(result.clears_markets(1e-6), "tau {tau}: {:?}", result.excess_demand);
    }
}

#[test]
fn government_budget_balances_at_equilibrium() {
    let result = solve(0.3);
    let outcome = &result.outcome;
    assert_abs_diff_eq!(outcome.transfer, 0.3 * outcome.consumer.c2, epsilon = 1e-7);
}

#[test]
fn tax_shrinks_good_two_and_moves_labor_to_firm_one() {
    let before = solve(0.0).outcome;
    let after = solve(0.3).outcome;

    assert!(after.firm2.output < before.firm2.output);
    assert!(after.firm1.labor > before.firm1.labor);
    assert!(after.labor_share_good1() > before.labor_share_good1());
}

#[test]
fn repeated_solves_are_identical() {
    assert_eq!(solve(0.15), solve(0.15));
}

#[test]
fn optimal_tax_is_positive_and_beats_laissez_faire() {
    let params = ModelParams::default();
    let solver = default_solver();
    let optimum = optimal_tax(&params, 0.0, 1.0, &solver).unwrap();

    assert!(optimum.tau > 0.0);
    assert_abs_diff_eq!(optimum.tau, 0.1669, epsilon = 0.01);
    assert_eq!(optimum.failed_trials, 0);
    assert!(optimum.welfare > social_welfare(&params, 0.0, &solver).unwrap());
    assert_abs_diff_eq!(
        optimum.transfer,
        optimum.tau * optimum.equilibrium.outcome.consumer.c2,
        epsilon = 1e-7
    );
}

#[test]
fn trial_outside_domain_is_an_error_not_a_default() {
    let err = welfare_at(&ModelParams::default(), -0.2, &default_solver()).unwrap_err();
    assert!(matches!(err, SolverError::InvalidInput(_)));
}
