//! One-dimensional root finding and bounded maximisation.
//!
//! Root finding follows the bracket-and-refine pattern: evaluate the function
//! on a uniform grid, take the first adjacent pair where it falls from
//! non-negative to negative, then bisect. Maximisation is Brent's method
//! (golden section with parabolic interpolation) on a closed interval.

use log::debug;

use crate::error::{Result, SolverError};

/// Golden-section fraction (3 - √5) / 2
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Uniform search grid `low, low + h, ..., high` with `points` nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub low: f64,
    pub high: f64,
    pub points: usize,
}

impl GridConfig {
    pub fn new(low: f64, high: f64, points: usize) -> Self {
        GridConfig { low, high, points }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(SolverError::invalid(format!(
                "grid bounds must be finite with low < high, got [{}, {}]",
                self.low, self.high
            )));
        }
        if self.points < 2 {
            return Err(SolverError::invalid(format!(
                "grid needs at least 2 points, got {}",
                self.points
            )));
        }
        Ok(())
    }

    /// Grid node `i` (0-based)
    pub fn value(&self, i: usize) -> f64 {
        if i + 1 == self.points {
            return self.high;
        }
        self.low + (self.high - self.low) * i as f64 / (self.points - 1) as f64
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.points).map(move |i| self.value(i))
    }

    /// Same interval with the spacing halved
    pub fn refined(&self) -> Self {
        GridConfig {
            points: self.points.saturating_sub(1) * 2 + 1,
            ..*self
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            low: 0.01,
            high: 10.0,
            points: 1000,
        }
    }
}

/// Interval with `f(low) >= 0 > f(high)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub low: f64,
    pub high: f64,
    pub f_low: f64,
    pub f_high: f64,
}

/// Outcome of a grid scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scan {
    /// The function is exactly zero at a grid node
    Root(f64),
    Bracket(Bracket),
}

/// Stopping rules for bisection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    /// Absolute tolerance on the argument (half-width of the bracket)
    pub x_tol: f64,
    /// Absolute tolerance on |f|
    pub f_tol: f64,
    pub max_iter: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        RootOptions {
            x_tol: 1e-6,
            f_tol: 1e-10,
            max_iter: 200,
        }
    }
}

/// A refined root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    /// |f(x)|
    pub residual: f64,
    pub iterations: usize,
}

/// Scan `grid` for the first downward sign change of `f`.
///
/// A node where `f` is exactly zero is returned directly. Evaluation errors
/// propagate unchanged.
pub fn scan_for_bracket<F>(f: &mut F, grid: &GridConfig) -> Result<Scan>
where
    F: FnMut(f64) -> Result<f64>,
{
    grid.validate()?;

    let mut previous: Option<(f64, f64)> = None;
    for x in grid.values() {
        let fx = f(x)?;
        if fx == 0.0 {
            return Ok(Scan::Root(x));
        }
        if let Some((x_prev, f_prev)) = previous {
            if f_prev >= 0.0 && fx < 0.0 {
                return Ok(Scan::Bracket(Bracket {
                    low: x_prev,
                    high: x,
                    f_low: f_prev,
                    f_high: fx,
                }));
            }
        }
        previous = Some((x, fx));
    }

    Err(SolverError::BracketNotFound {
        low: grid.low,
        high: grid.high,
        points: grid.points,
    })
}

/// Bisect `bracket` until either tolerance in `options` is met
pub fn bisect<F>(f: &mut F, bracket: Bracket, options: &RootOptions) -> Result<Root>
where
    F: FnMut(f64) -> Result<f64>,
{
    let mut low = bracket.low;
    let mut high = bracket.high;
    let mut mid = 0.5 * (low + high);
    let mut f_mid = f64::INFINITY;

    for iteration in 1..=options.max_iter {
        mid = 0.5 * (low + high);
        f_mid = f(mid)?;

        if f_mid == 0.0 || f_mid.abs() <= options.f_tol || 0.5 * (high - low) <= options.x_tol {
            debug!(
                "bisection converged at x={mid:.10} |f|={:.3e} after {iteration} iterations",
                f_mid.abs()
            );
            return Ok(Root {
                x: mid,
                residual: f_mid.abs(),
                iterations: iteration,
            });
        }

        if f_mid > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }

    Err(SolverError::NonConvergence {
        best: vec![mid],
        residual: f_mid.abs(),
        iterations: options.max_iter,
    })
}

/// Grid scan followed by bisection
pub fn find_root_on_grid<F>(f: &mut F, grid: &GridConfig, options: &RootOptions) -> Result<Root>
where
    F: FnMut(f64) -> Result<f64>,
{
    match scan_for_bracket(f, grid)? {
        Scan::Root(x) => Ok(Root {
            x,
            residual: 0.0,
            iterations: 0,
        }),
        Scan::Bracket(bracket) => bisect(f, bracket, options),
    }
}

/// Stopping rules for bounded maximisation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaximizeOptions {
    /// Absolute tolerance on the argument
    pub x_tol: f64,
    pub max_iter: usize,
}

impl Default for MaximizeOptions {
    fn default() -> Self {
        MaximizeOptions {
            x_tol: 1e-10,
            max_iter: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maximum {
    pub x: f64,
    pub value: f64,
    pub iterations: usize,
}

/// Maximise `f` on `[low, high]` with Brent's method.
///
/// `f` may return `-inf` (or NaN) for infeasible points; those are never
/// preferred over a finite value.
pub fn maximize_bounded<F>(
    mut f: F,
    low: f64,
    high: f64,
    options: &MaximizeOptions,
) -> Result<Maximum>
where
    F: FnMut(f64) -> f64,
{
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(SolverError::invalid(format!(
            "maximisation bounds must be finite with low < high, got [{low}, {high}]"
        )));
    }

    // Work on g = -f so the bookkeeping reads as a minimisation.
    let mut g = |x: f64| {
        let value = -f(x);
        if value.is_nan() { f64::INFINITY } else { value }
    };

    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = (low, high);
    let mut x = a + GOLDEN * (b - a);
    let (mut w, mut v) = (x, x);
    let mut gx = g(x);
    let (mut gw, mut gv) = (gx, gx);
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for iteration in 1..=options.max_iter {
        let xm = 0.5 * (a + b);
        let tol1 = sqrt_eps * x.abs() + options.x_tol / 3.0;
        let tol2 = 2.0 * tol1;

        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return Ok(Maximum {
                x,
                value: -gx,
                iterations: iteration,
            });
        }

        let mut golden_step = true;
        if e.abs() > tol1 {
            let r = (x - w) * (gx - gv);
            let mut q = (x - v) * (gx - gw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_prev = e;
            e = d;
            if p.abs() < (0.5 * q * e_prev).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(xm - x);
                }
                golden_step = false;
            }
        }
        if golden_step {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN * e;
        }

        let u = if d.abs() >= tol1 { x + d } else { x + tol1.copysign(d) };
        let gu = g(u);

        if gu <= gx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            gv = gw;
            w = x;
            gw = gx;
            x = u;
            gx = gu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if gu <= gw || w == x {
                v = w;
                gv = gw;
                w = u;
                gw = gu;
            } else if gu <= gv || v == x || v == w {
                v = u;
                gv = gu;
            }
        }
    }

    Err(SolverError::NonConvergence {
        best: vec![x],
        residual: b - a,
        iterations: options.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_endpoints_are_exact() {
        let grid = GridConfig::new(0.5, 2.5, 76);
        let values: Vec<f64> = grid.values().collect();
        assert_eq!(values.len(), 76);
        assert_eq!(values[0], 0.5);
        assert_eq!(values[75], 2.5);
        assert_abs_diff_eq!(values[1], 0.5 + 2.0 / 75.0, epsilon = 1e-15);
    }

    #[test]
    fn refined_grid_halves_spacing() {
        let grid = GridConfig::new(0.0, 1.0, 11).refined();
        assert_eq!(grid.points, 21);
        assert_abs_diff_eq!(grid.value(1), 0.05, epsilon = 1e-15);
    }

    #[test]
    fn refining_an_empty_grid_stays_invalid() {
        let grid = GridConfig::new(0.0, 1.0, 0).refined();
        assert_eq!(grid.points, 1);
        assert!(matches!(grid.validate(), Err(SolverError::InvalidInput(_))));
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let mut f = |x: f64| Ok(1.0 - x);
        let result = scan_for_bracket(&mut f, &GridConfig::new(2.0, 1.0, 10));
        assert!(matches!(result, Err(SolverError::InvalidInput(_))));
    }

    #[test]
    fn scan_finds_first_downward_crossing() {
        // Negative below 1, positive between 1 and 3, negative above 3.
        let mut f = |x: f64| Ok(-(x - 1.0) * (x - 3.0));
        let scan = scan_for_bracket(&mut f, &GridConfig::new(0.05, 4.05, 41)).unwrap();
        match scan {
            Scan::Bracket(b) => {
                assert!(b.low < 3.0 && b.high > 3.0);
                assert!(b.f_low >= 0.0 && b.f_high < 0.0);
            }
            Scan::Root(_) => panic!("expected a bracket"),
        }
    }

    #[test]
    fn exact_zero_on_grid_skips_refinement() {
        let mut calls = 0;
        let mut f = |x: f64| {
            calls += 1;
            Ok(1.0 - x)
        };
        let root = find_root_on_grid(&mut f, &GridConfig::new(0.0, 2.0, 3), &RootOptions::default())
            .unwrap();
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);
        assert_eq!(calls, 2);
    }

    #[test]
    fn no_sign_change_reports_bracket_not_found() {
        let mut f = |x: f64| Ok(-x - 1.0);
        let err = find_root_on_grid(&mut f, &GridConfig::new(0.0, 5.0, 50), &RootOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::BracketNotFound {
                low: 0.0,
                high: 5.0,
                points: 50
            }
        );
    }

    #[test]
    fn bisection_reaches_price_tolerance() {
        let mut f = |x: f64| Ok(2.0 - x * x);
        let options = RootOptions {
            x_tol: 1e-12,
            f_tol: 0.0,
            max_iter: 200,
        };
        let root = find_root_on_grid(&mut f, &GridConfig::new(0.1, 3.0, 30), &options).unwrap();
        assert_abs_diff_eq!(root.x, 2f64.sqrt(), epsilon = 1e-11);
    }

    #[test]
    fn bisection_budget_exhaustion_is_non_convergence() {
        let mut f = |x: f64| Ok(2.0 - x * x);
        let options = RootOptions {
            x_tol: 0.0,
            f_tol: 0.0,
            max_iter: 5,
        };
        let err = find_root_on_grid(&mut f, &GridConfig::new(0.1, 3.0, 30), &options).unwrap_err();
        match err {
            SolverError::NonConvergence { best, iterations, .. } => {
                assert_eq!(iterations, 5);
                assert!((best[0] - 2f64.sqrt()).abs() < 0.1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn evaluation_errors_propagate() {
        let mut f = |x: f64| {
            if x > 1.0 {
                Err(SolverError::invalid("boom"))
            } else {
                Ok(1.0)
            }
        };
        let err = find_root_on_grid(&mut f, &GridConfig::new(0.0, 2.0, 5), &RootOptions::default())
            .unwrap_err();
        assert_eq!(err, SolverError::invalid("boom"));
    }

    #[test]
    fn brent_finds_interior_maximum() {
        let max = maximize_bounded(
            |x| -(x - 0.7).powi(2) + 3.0,
            0.0,
            2.0,
            &MaximizeOptions::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(max.x, 0.7, epsilon = 1e-7);
        assert_abs_diff_eq!(max.value, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn brent_respects_bounds() {
        let max = maximize_bounded(|x| x, 0.0, 1.0, &MaximizeOptions::default()).unwrap();
        assert!(max.x <= 1.0 && max.x > 0.999);
    }

    #[test]
    fn brent_ignores_infeasible_region() {
        let f = |x: f64| if x < 0.5 { f64::NEG_INFINITY } else { -(x - 0.8).powi(2) };
        let max = maximize_bounded(f, 0.0, 1.0, &MaximizeOptions::default()).unwrap();
        assert_abs_diff_eq!(max.x, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn brent_rejects_empty_interval() {
        assert!(maximize_bounded(|x| x, 1.0, 1.0, &MaximizeOptions::default()).is_err());
    }
}
