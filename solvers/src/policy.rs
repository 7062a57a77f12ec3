//! Outer optimisation of a scalar policy parameter.
//!
//! Each trial value runs a full inner solve supplied by the caller. Trials
//! whose inner solve fails count as W = -inf and never win.

use log::{debug, warn};

use crate::error::{Result, SolverError};
use crate::scalar::{MaximizeOptions, maximize_bounded};

/// Best policy value found and how the search went
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyOptimum {
    pub argmax: f64,
    pub value: f64,
    pub evaluations: usize,
    pub failed_trials: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyOptimizer {
    options: MaximizeOptions,
}

impl PolicyOptimizer {
    pub fn new(options: MaximizeOptions) -> Self {
        PolicyOptimizer { options }
    }

    /// Maximise `welfare` over `[low, high]`
    pub fn maximize<F>(&self, low: f64, high: f64, mut welfare: F) -> Result<PolicyOptimum>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let mut evaluations = 0;
        let mut failed_trials = 0;

        let maximum = maximize_bounded(
            |policy| {
                evaluations += 1;
                match welfare(policy) {
                    Ok(value) if value.is_finite() => value,
                    Ok(value) => {
                        warn!(
                            "policy {policy:.6}: welfare is not finite ({value}), trial discarded"
                        );
                        failed_trials += 1;
                        f64::NEG_INFINITY
                    }
                    Err(err) => {
                        warn!("policy {policy:.6}: inner solve failed, trial discarded: {err}");
                        failed_trials += 1;
                        f64::NEG_INFINITY
                    }
                }
            },
            low,
            high,
            &self.options,
        )?;

        if failed_trials == evaluations {
            return Err(SolverError::OuterOptimizationInfeasible {
                trials: evaluations,
            });
        }

        debug!(
            "policy optimum {:.6} with welfare {:.6} ({evaluations} trials, {failed_trials} failed)",
            maximum.x, maximum.value
        );

        Ok(PolicyOptimum {
            argmax: maximum.x,
            value: maximum.value,
            evaluations,
            failed_trials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_interior_policy() {
        let optimum = PolicyOptimizer::default()
            .maximize(0.0, 1.0, |t| Ok(-(t - 0.3) * (t - 0.3)))
            .unwrap();
        assert_abs_diff_eq!(optimum.argmax, 0.3, epsilon = 1e-6);
        assert_eq!(optimum.failed_trials, 0);
        assert!(optimum.evaluations > 0);
    }

    #[test]
    fn tolerates_failed_trials() {
        let optimum = PolicyOptimizer::default()
            .maximize(0.0, 1.0, |t| {
                if t > 0.5 {
                    Err(SolverError::NonConvergence {
                        best: vec![t],
                        residual: 1.0,
                        iterations: 10,
                    })
                } else {
                    Ok(-(t - 0.2) * (t - 0.2))
                }
            })
            .unwrap();
        assert_abs_diff_eq!(optimum.argmax, 0.2, epsilon = 1e-6);
        assert!(optimum.failed_trials > 0);
    }

    #[test]
    fn all_trials_failing_is_infeasible() {
        let err = PolicyOptimizer::default()
            .maximize(0.0, 1.0, |_| Err(SolverError::invalid("pathological")))
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::OuterOptimizationInfeasible { trials } if trials > 0
        ));
    }
}
