use serde::{Deserialize, Serialize};
use solvers::error::{check_closed_unit, check_open_unit};
use solvers::Result;

/// A bundle of the two goods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub x1: f64,
    pub x2: f64,
}

impl Bundle {
    pub fn new(x1: f64, x2: f64) -> Self {
        Bundle { x1, x2 }
    }

    /// What is left of the unit-total economy after this bundle
    pub fn complement(&self) -> Self {
        Bundle {
            x1: 1.0 - self.x1,
            x2: 1.0 - self.x2,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.x1 >= 0.0 && self.x2 >= 0.0 && self.x1 <= 1.0 && self.x2 <= 1.0
    }
}

/// Preferences and endowments of the two-agent exchange economy.
///
/// Total endowment of each good is 1; agent B holds whatever A does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeParams {
    /// Agent A's Cobb-Douglas weight on good 1
    pub alpha: f64,
    /// Agent B's Cobb-Douglas weight on good 1
    pub beta: f64,
    /// A's endowment of good 1
    pub w1a: f64,
    /// A's endowment of good 2
    pub w2a: f64,
}

impl ExchangeParams {
    pub fn validate(&self) -> Result<()> {
        check_open_unit("alpha", self.alpha)?;
        check_open_unit("beta", self.beta)?;
        check_closed_unit("w1A", self.w1a)?;
        check_closed_unit("w2A", self.w2a)?;
        Ok(())
    }

    /// Same preferences, different endowment for A
    pub fn with_endowment(&self, endowment_a: Bundle) -> Self {
        ExchangeParams {
            w1a: endowment_a.x1,
            w2a: endowment_a.x2,
            ..self.clone()
        }
    }

    pub fn endowment_a(&self) -> Bundle {
        Bundle::new(self.w1a, self.w2a)
    }

    pub fn endowment_b(&self) -> Bundle {
        self.endowment_a().complement()
    }
}

impl Default for ExchangeParams {
    fn default() -> Self {
        ExchangeParams {
            alpha: 1.0 / 3.0,
            beta: 2.0 / 3.0,
            w1a: 0.8,
            w2a: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ExchangeParams::default().validate().is_ok());
    }

    #[test]
    fn weight_on_boundary_is_rejected() {
        for alpha in [0.0, 1.0] {
            let params = ExchangeParams {
                alpha,
                ..Default::default()
            };
            assert!(params.validate().is_err());
        }
    }

    #[test]
    fn b_holds_the_complement() {
        let params = ExchangeParams::default();
        let b = params.endowment_b();
        assert!((b.x1 - 0.2).abs() < 1e-12);
        assert!((b.x2 - 0.7).abs() < 1e-12);
    }
}
