//! Damped Newton iteration for square nonlinear systems.
//!
//! The Jacobian is approximated with forward differences, the Newton step is
//! found by Gaussian elimination, and the step is halved until the residual
//! norm decreases and every unknown stays strictly positive (the unknowns are
//! prices).

use log::debug;

use crate::error::{Result, SolverError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Convergence threshold on the max-abs residual
    pub tol: f64,
    pub max_iter: usize,
    /// Relative forward-difference step
    pub fd_step: f64,
    /// Smallest step fraction tried before giving up on a direction
    pub min_damping: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        NewtonConfig {
            tol: 1e-8,
            max_iter: 100,
            fd_step: 1e-6,
            min_damping: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewtonSolution {
    pub x: Vec<f64>,
    /// Max-abs residual at `x`
    pub residual: f64,
    pub iterations: usize,
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

fn euclidean(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Forward-difference Jacobian, column `j` = ∂f/∂x_j
fn jacobian<F>(f: &mut F, x: &[f64], fx: &[f64], fd_step: f64) -> Result<Vec<Vec<f64>>>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>>,
{
    let n = x.len();
    let mut jac = vec![vec![0.0; n]; fx.len()];
    let mut shifted = x.to_vec();

    for j in 0..n {
        let h = fd_step * x[j].abs().max(1.0);
        shifted[j] = x[j] + h;
        let f_shifted = f(&shifted)?;
        shifted[j] = x[j];
        for (row, (fs, f0)) in jac.iter_mut().zip(f_shifted.iter().zip(fx)) {
            row[j] = (fs - f0) / h;
        }
    }

    Ok(jac)
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when the matrix is numerically singular.
pub fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &k| a[i][col].abs().total_cmp(&a[k][col].abs()))?;
        if a[pivot][col].abs() <= 1e-13 * scale {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Find `x > 0` with `f(x) ≈ 0`, starting from `x0`.
///
/// Trial points that fail to evaluate are treated like points that do not
/// reduce the residual. Running out of iterations, hitting a singular
/// Jacobian or failing to find a descent step all report
/// [`SolverError::NonConvergence`] with the best point found.
pub fn newton_solve<F>(f: &mut F, x0: &[f64], config: &NewtonConfig) -> Result<NewtonSolution>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>>,
{
    if x0.is_empty() || x0.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(SolverError::invalid(format!(
            "initial guess must be non-empty and strictly positive, got {x0:?}"
        )));
    }

    let mut x = x0.to_vec();
    let mut fx = f(&x)?;
    if fx.len() != x.len() {
        return Err(SolverError::invalid(format!(
            "system has {} equations for {} unknowns",
            fx.len(),
            x.len()
        )));
    }

    let unconverged = |x: &[f64], fx: &[f64], iterations: usize| SolverError::NonConvergence {
        best: x.to_vec(),
        residual: max_abs(fx),
        iterations,
    };

    for iteration in 0..config.max_iter {
        let residual = max_abs(&fx);
        debug!("newton iteration {iteration}: x={x:?} residual={residual:.3e}");
        if residual <= config.tol {
            return Ok(NewtonSolution {
                x,
                residual,
                iterations: iteration,
            });
        }

        let jac = jacobian(f, &x, &fx, config.fd_step)?;
        let rhs: Vec<f64> = fx.iter().map(|v| -v).collect();
        let Some(step) = solve_linear(jac, rhs) else {
            return Err(unconverged(&x, &fx, iteration));
        };

        let norm = euclidean(&fx);
        let mut damping = 1.0;
        loop {
            let trial: Vec<f64> = x.iter().zip(&step).map(|(xi, di)| xi + damping * di).collect();
            if trial.iter().all(|v| v.is_finite() && *v > 0.0) {
                if let Ok(f_trial) = f(&trial) {
                    let trial_norm = euclidean(&f_trial);
                    if trial_norm.is_finite() && trial_norm < (1.0 - 1e-4 * damping) * norm {
                        x = trial;
                        fx = f_trial;
                        break;
                    }
                }
            }
            damping *= 0.5;
            if damping < config.min_damping {
                return Err(unconverged(&x, &fx, iteration + 1));
            }
        }
    }

    let residual = max_abs(&fx);
    if residual <= config.tol {
        Ok(NewtonSolution {
            x,
            residual,
            iterations: config.max_iter,
        })
    } else {
        Err(unconverged(&x, &fx, config.max_iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_solve_with_pivoting() {
        let a = vec![vec![0.0, 2.0], vec![3.0, 1.0]];
        let x = solve_linear(a, vec![4.0, 5.0]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_is_detected() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve_linear(a, vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn newton_solves_positive_system() {
        // x^2 + y^2 = 5, x*y = 2 with x, y > 0 and x > y
        let mut f = |v: &[f64]| Ok(vec![v[0] * v[0] + v[1] * v[1] - 5.0, v[0] * v[1] - 2.0]);
        let sol = newton_solve(&mut f, &[3.0, 0.5], &NewtonConfig::default()).unwrap();
        assert_abs_diff_eq!(sol.x[0], 2.0, epsilon = 1e-7);
        assert_abs_diff_eq!(sol.x[1], 1.0, epsilon = 1e-7);
        assert!(sol.residual <= 1e-8);
    }

    #[test]
    fn steps_stay_positive() {
        // Root at 0.01; a full Newton step from 1.0 would overshoot below zero.
        let mut f = |v: &[f64]| Ok(vec![v[0].ln() - 0.01f64.ln()]);
        let sol = newton_solve(&mut f, &[1.0], &NewtonConfig::default()).unwrap();
        assert_abs_diff_eq!(sol.x[0], 0.01, epsilon = 1e-9);
    }

    #[test]
    fn no_root_reports_non_convergence() {
        let mut f = |v: &[f64]| Ok(vec![v[0] * v[0] + 1.0]);
        let config = NewtonConfig {
            max_iter: 20,
            ..NewtonConfig::default()
        };
        let err = newton_solve(&mut f, &[1.0], &config).unwrap_err();
        match err {
            SolverError::NonConvergence { best, residual, .. } => {
                assert_eq!(best.len(), 1);
                assert!(residual >= 1.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_initial_guess() {
        let mut f = |v: &[f64]| Ok(v.to_vec());
        assert!(matches!(
            newton_solve(&mut f, &[0.0, 1.0], &NewtonConfig::default()),
            Err(SolverError::InvalidInput(_))
        ));
    }
}
