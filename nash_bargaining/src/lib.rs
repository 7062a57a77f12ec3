//! One-shot asymmetric Nash bargaining between a worker and a firm.
//!
//! A match produces θ. The worker's outside option is d1, the firm's is d2,
//! and the worker's bargaining weight is α. The wage maximises the Nash
//! product (w − d1)^α (θ − w − d2)^(1−α).

use log::debug;
use serde::{Deserialize, Serialize};
use solvers::error::check_open_unit;
use solvers::scalar::{maximize_bounded, MaximizeOptions};
use solvers::{Result, SolverError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BargainingParams {
    /// Output of the match
    pub theta: f64,
    /// Worker's disagreement payoff
    pub d1: f64,
    /// Firm's disagreement payoff
    pub d2: f64,
    /// Worker's bargaining weight
    pub alpha: f64,
}

impl Default for BargainingParams {
    fn default() -> Self {
        BargainingParams {
            theta: 60.0,
            d1: 10.0,
            d2: 0.0,
            alpha: 1.0 / 3.0,
        }
    }
}

impl BargainingParams {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("alpha", self.alpha)?;
        if ![self.theta, self.d1, self.d2].iter().all(|v| v.is_finite()) {
            return Err(SolverError::invalid(format!(
                "payoffs must be finite, got theta={}, d1={}, d2={}",
                self.theta, self.d1, self.d2
            )));
        }
        if self.surplus() <= 0.0 {
            return Err(SolverError::invalid(format!(
                "no gains from trade: theta - d2 = {} does not exceed d1 = {}",
                self.theta - self.d2,
                self.d1
            )));
        }
        Ok(())
    }

    /// θ − d1 − d2, the gain from agreeing
    pub fn surplus(&self) -> f64 {
        self.theta - self.d1 - self.d2
    }

    pub fn nash_product(&self, wage: f64) -> f64 {
        let worker = wage - self.d1;
        let firm = self.theta - wage - self.d2;
        if worker < 0.0 || firm < 0.0 {
            return 0.0;
        }
        worker.powf(self.alpha) * firm.powf(1.0 - self.alpha)
    }
}

/// Agreed wage and the resulting gains over disagreement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Agreement {
    pub wage: f64,
    pub worker_gain: f64,
    pub firm_gain: f64,
    pub nash_product: f64,
}

impl Agreement {
    fn at(params: &BargainingParams, wage: f64) -> Self {
        Agreement {
            wage,
            worker_gain: wage - params.d1,
            firm_gain: params.theta - wage - params.d2,
            nash_product: params.nash_product(wage),
        }
    }
}

/// w* = d1 + α(θ − d1 − d2)
pub fn analytical_wage(params: &BargainingParams) -> Result<Agreement> {
    params.validate()?;
    Ok(Agreement::at(
        params,
        params.d1 + params.alpha * params.surplus(),
    ))
}

/// Maximise the Nash product over wages in [d1, θ − d2].
///
/// The search runs over the worker's share of the surplus so the tolerance
/// does not scale with the level of output.
pub fn numerical_wage(params: &BargainingParams) -> Result<Agreement> {
    params.validate()?;
    let surplus = params.surplus();
    let log_product = |share: f64| {
        params.alpha * share.ln() + (1.0 - params.alpha) * (1.0 - share).ln()
    };

    let best = maximize_bounded(log_product, 0.0, 1.0, &MaximizeOptions::default())?;
    debug!(
        "nash bargaining: worker share {:.10} after {} iterations",
        best.x, best.iterations
    );
    Ok(Agreement::at(params, params.d1 + best.x * surplus))
}

/// Analytical wage for each worker bargaining weight in `weights`
pub fn wage_by_weight(params: &BargainingParams, weights: &[f64]) -> Result<Vec<(f64, f64)>> {
    weights
        .iter()
        .map(|&alpha| {
            let scenario = BargainingParams {
                alpha,
                ..params.clone()
            };
            analytical_wage(&scenario).map(|agreement| (alpha, agreement.wage))
        })
        .collect()
}
