use thiserror::Error;

/// Failure outcomes of the numerical kernel.
///
/// Every variant is an ordinary, reportable result: callers decide whether to
/// widen a grid, change parameters or give up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Out-of-domain parameter or a non-positive price
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The grid scan found no sign change of excess demand
    #[error("no bracket found: excess demand never changes sign on [{low}, {high}] ({points} grid points)")]
    BracketNotFound { low: f64, high: f64, points: usize },

    /// Iteration budget exhausted; `best` is the last candidate and `residual` its error
    #[error(
        "equilibrium not found for these parameters: residual {residual:.3e} after {iterations} iterations (best candidate {best:?})"
    )]
    NonConvergence {
        best: Vec<f64>,
        residual: f64,
        iterations: usize,
    },

    /// Every trial of the outer policy search failed in the inner solve
    #[error("outer optimization infeasible: all {trials} policy trials failed")]
    OuterOptimizationInfeasible { trials: usize },
}

impl SolverError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SolverError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Require `value` in the open interval (0, 1)
pub fn check_open_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(SolverError::invalid(format!(
            "{name} must lie in the open interval (0, 1), got {value}"
        )))
    }
}

/// Require `value` in the closed interval [0, 1]
pub fn check_closed_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SolverError::invalid(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

pub fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SolverError::invalid(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

pub fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SolverError::invalid(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}
