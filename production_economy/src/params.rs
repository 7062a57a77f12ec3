use serde::{Deserialize, Serialize};
use solvers::error::{check_non_negative, check_open_unit, check_positive};
use solvers::Result;

/// Parameters of the two-firm production economy.
///
/// Labour is the numeraire (w = 1). Both firms share the same technology
/// y = A·ℓ^γ; good 2 carries a per-unit tax τ whose revenue is rebated
/// lump-sum to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Total factor productivity (A)
    pub productivity: f64,
    /// Output elasticity of labour (γ)
    pub gamma: f64,
    /// Consumer's Cobb-Douglas weight on good 1 (α)
    pub alpha: f64,
    /// Scale of the disutility of labour (ν)
    pub nu: f64,
    /// Curvature of the disutility of labour (ε)
    pub epsilon: f64,
    /// Per-unit tax on good 2 (τ)
    pub tau: f64,
    /// Social cost per unit of good 2 produced (κ)
    pub kappa: f64,
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        check_positive("A", self.productivity)?;
        check_open_unit("gamma", self.gamma)?;
        check_open_unit("alpha", self.alpha)?;
        check_positive("nu", self.nu)?;
        check_positive("epsilon", self.epsilon)?;
        check_non_negative("tau", self.tau)?;
        check_non_negative("kappa", self.kappa)?;
        Ok(())
    }

    /// Same economy with a different tax rate
    pub fn with_tax(&self, tau: f64) -> Self {
        ModelParams {
            tau,
            ..self.clone()
        }
    }

    /// Upper bound on hours: with non-negative non-labour income the
    /// first-order condition gives ℓ^(1+ε) ≤ 1/ν
    pub fn max_labor(&self) -> f64 {
        2.0 * self.nu.powf(-1.0 / (1.0 + self.epsilon))
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            productivity: 1.0,
            gamma: 0.5,
            alpha: 0.3,
            nu: 1.0,
            epsilon: 2.0,
            tau: 0.0,
            kappa: 0.1,
        }
    }
}
