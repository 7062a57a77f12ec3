use serde::Serialize;
use solvers::scalar::{maximize_bounded, MaximizeOptions};
use solvers::{Result, SolverError};

use crate::params::ModelParams;

/// Hours are searched from here; at zero hours and zero other income log utility is -inf
const LABOR_FLOOR: f64 = 1e-10;

/// The representative consumer's choice at given prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsumerChoice {
    pub labor: f64,
    /// Wage income plus transfer plus profits
    pub income: f64,
    pub c1: f64,
    pub c2: f64,
    pub utility: f64,
}

/// log(c1^α c2^(1−α)) − ν ℓ^(1+ε) / (1+ε)
pub fn utility(c1: f64, c2: f64, labor: f64, params: &ModelParams) -> f64 {
    let ModelParams {
        alpha, nu, epsilon, ..
    } = *params;
    alpha * c1.ln() + (1.0 - alpha) * c2.ln() - nu * labor.powf(1.0 + epsilon) / (1.0 + epsilon)
}

/// Cobb-Douglas demand; good 2 costs p2 + τ to the consumer
pub fn consumption(p1: f64, p2: f64, income: f64, params: &ModelParams) -> Result<(f64, f64)> {
    if !(p1.is_finite() && p1 > 0.0 && p2.is_finite() && p2 > 0.0) {
        return Err(SolverError::invalid(format!(
            "goods prices must be positive, got p1={p1}, p2={p2}"
        )));
    }
    let alpha = params.alpha;
    Ok((
        alpha * income / p1,
        (1.0 - alpha) * income / (p2 + params.tau),
    ))
}

/// Hours worked and consumption maximising utility at wage 1, given the
/// income the consumer receives regardless of hours (profits and transfer).
pub fn optimal_labor(
    p1: f64,
    p2: f64,
    non_labor_income: f64,
    params: &ModelParams,
) -> Result<ConsumerChoice> {
    if !(non_labor_income.is_finite() && non_labor_income >= 0.0) {
        return Err(SolverError::invalid(format!(
            "non-labour income must be non-negative, got {non_labor_income}"
        )));
    }
    // Reject bad prices before the search, which would otherwise see -inf everywhere.
    consumption(p1, p2, 1.0, params)?;

    let value = |labor: f64| {
        let income = labor + non_labor_income;
        match consumption(p1, p2, income, params) {
            Ok((c1, c2)) => utility(c1, c2, labor, params),
            Err(_) => f64::NEG_INFINITY,
        }
    };
    let best = maximize_bounded(
        value,
        LABOR_FLOOR,
        params.max_labor(),
        &MaximizeOptions::default(),
    )?;

    let labor = best.x;
    let income = labor + non_labor_income;
    let (c1, c2) = consumption(p1, p2, income, params)?;
    Ok(ConsumerChoice {
        labor,
        income,
        c1,
        c2,
        utility: best.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn labor_supply_satisfies_first_order_condition() {
        let params = ModelParams::default();
        for other_income in [0.0, 0.3, 1.2] {
            let choice = optimal_labor(1.0, 1.5, other_income, &params).unwrap();
            // Marginal utility of income equals marginal disutility of an hour
            let foc = 1.0 / choice.income - params.nu * choice.labor.powf(params.epsilon);
            assert_abs_diff_eq!(foc, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn more_other_income_means_fewer_hours() {
        let params = ModelParams::default();
        let poor = optimal_labor(1.0, 1.0, 0.1, &params).unwrap();
        let rich = optimal_labor(1.0, 1.0, 1.0, &params).unwrap();
        assert!(rich.labor < poor.labor);
    }

    #[test]
    fn tax_raises_consumer_price_of_good_two() {
        let params = ModelParams::default().with_tax(0.5);
        let (c1, c2) = consumption(1.0, 1.0, 2.0, &params).unwrap();
        assert_abs_diff_eq!(c1, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(c2, 1.4 / 1.5, epsilon = 1e-12);
    }

    #[test]
    fn negative_income_is_invalid() {
        assert!(matches!(
            optimal_labor(1.0, 1.0, -0.5, &ModelParams::default()),
            Err(SolverError::InvalidInput(_))
        ));
    }
}
