use serde::Serialize;
use solvers::{Result, SolverError};

use crate::params::ModelParams;

/// Profit-maximising choice of a price-taking firm
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FirmChoice {
    pub labor: f64,
    pub output: f64,
    pub profit: f64,
}

/// Labour demand, output and profit at output price `price` and wage `wage`.
///
/// ℓ = (γ·p·A / w)^(1/(1−γ)), y = A·ℓ^γ and π = p·y − w·ℓ, which equals
/// (1−γ)/γ · w·ℓ at the optimum.
pub fn firm_output(price: f64, wage: f64, params: &ModelParams) -> Result<FirmChoice> {
    if !(price.is_finite() && price > 0.0 && wage.is_finite() && wage > 0.0) {
        return Err(SolverError::invalid(format!(
            "firm prices must be positive, got p={price}, w={wage}"
        )));
    }

    let ModelParams {
        productivity: a,
        gamma,
        ..
    } = *params;
    let labor = (gamma * price * a / wage).powf(1.0 / (1.0 - gamma));
    let output = a * labor.powf(gamma);

    Ok(FirmChoice {
        labor,
        output,
        profit: price * output - wage * labor,
    })
}
