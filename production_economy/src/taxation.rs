//! Welfare evaluation of the tax on good 2 and the search for the best rate.
//!
//! Social welfare is the consumer's utility at the induced equilibrium minus
//! the social cost κ of every unit of good 2 produced. Each trial tax rate
//! builds a fresh economy and runs the full equilibrium solve.

use log::{info, warn};
use serde::Serialize;
use solvers::{
    EquilibriumResult, EquilibriumSolver, MaximizeOptions, PolicyOptimizer, Result,
};

use crate::model::{MarketOutcome, ProductionEconomy};
use crate::params::ModelParams;

/// Stopping rule for the outer search; finer than the noise of the inner solve is wasted
pub const TAX_SEARCH: MaximizeOptions = MaximizeOptions {
    x_tol: 1e-6,
    max_iter: 200,
};

/// U(c1, c2, ℓ) − κ·y2 at an outcome
pub fn welfare_of(outcome: &MarketOutcome, params: &ModelParams) -> f64 {
    outcome.consumer.utility - params.kappa * outcome.firm2.output
}

/// Equilibrium at tax rate `tau` and the welfare it delivers
pub fn welfare_at(
    params: &ModelParams,
    tau: f64,
    solver: &EquilibriumSolver,
) -> Result<(f64, EquilibriumResult<MarketOutcome>)> {
    let economy = ProductionEconomy::new(params.with_tax(tau))?;
    let equilibrium = economy.solve_equilibrium(solver)?;
    Ok((welfare_of(&equilibrium.outcome, economy.params()), equilibrium))
}

pub fn social_welfare(params: &ModelParams, tau: f64, solver: &EquilibriumSolver) -> Result<f64> {
    welfare_at(params, tau, solver).map(|(welfare, _)| welfare)
}

/// Welfare-maximising tax rate and the equilibrium it induces
#[derive(Debug, Clone, PartialEq)]
pub struct TaxOptimum {
    pub tau: f64,
    /// Lump-sum transfer T = τ·c2 at the optimum
    pub transfer: f64,
    pub welfare: f64,
    pub equilibrium: EquilibriumResult<MarketOutcome>,
    pub evaluations: usize,
    pub failed_trials: usize,
}

/// Search [low, high] for the tax rate maximising social welfare
pub fn optimal_tax(
    params: &ModelParams,
    low: f64,
    high: f64,
    solver: &EquilibriumSolver,
) -> Result<TaxOptimum> {
    params.validate()?;

    let optimizer = PolicyOptimizer::new(TAX_SEARCH);
    let optimum = optimizer.maximize(low, high, |tau| social_welfare(params, tau, solver))?;

    // Re-solve at the winner to hand back the full equilibrium.
    let (welfare, equilibrium) = welfare_at(params, optimum.argmax, solver)?;
    info!(
        "optimal tax {:.4}: transfer {:.4}, welfare {:.6} ({} trials)",
        optimum.argmax, equilibrium.outcome.transfer, welfare, optimum.evaluations
    );

    Ok(TaxOptimum {
        tau: optimum.argmax,
        transfer: equilibrium.outcome.transfer,
        welfare,
        equilibrium,
        evaluations: optimum.evaluations,
        failed_trials: optimum.failed_trials,
    })
}

/// One row of a tax sweep; `None` fields mark a failed inner solve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub tau: f64,
    pub outcome: Option<MarketOutcome>,
    pub welfare: Option<f64>,
}

/// Equilibrium and welfare at each tax rate in `taxes`
pub fn tax_sweep(
    params: &ModelParams,
    taxes: &[f64],
    solver: &EquilibriumSolver,
) -> Vec<SweepPoint> {
    taxes
        .iter()
        .map(|&tau| match welfare_at(params, tau, solver) {
            Ok((welfare, equilibrium)) => SweepPoint {
                tau,
                outcome: Some(equilibrium.outcome),
                welfare: Some(welfare),
            },
            Err(err) => {
                warn!("tax {tau}: {err}");
                SweepPoint {
                    tau,
                    outcome: None,
                    welfare: None,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_solver;

    #[test]
    fn sweep_records_failures_without_stopping() {
        let points = tax_sweep(&ModelParams::default(), &[0.0, -1.0, 0.2], &default_solver());
        assert_eq!(points.len(), 3);
        assert!(points[0].welfare.is_some());
        assert!(points[1].outcome.is_none());
        assert!(points[1].welfare.is_none());
        assert!(points[2].outcome.is_some());
    }

    #[test]
    fn welfare_penalises_good_two_output() {
        let solver = default_solver();
        let clean = ModelParams {
            kappa: 0.0,
            ..Default::default()
        };
        let dirty = ModelParams {
            kappa: 0.5,
            ..Default::default()
        };
        let (w_clean, eq) = welfare_at(&clean, 0.0, &solver).unwrap();
        let w_dirty = social_welfare(&dirty, 0.0, &solver).unwrap();
        approx::assert_abs_diff_eq!(
            w_clean - w_dirty,
            0.5 * eq.outcome.firm2.output,
            epsilon = 1e-6
        );
    }

    #[test]
    fn no_externality_means_no_tax() {
        let params = ModelParams {
            kappa: 0.0,
            ..Default::default()
        };
        let optimum = optimal_tax(&params, 0.0, 1.0, &default_solver()).unwrap();
        assert!(optimum.tau < 0.02, "tau {}", optimum.tau);
    }
}
