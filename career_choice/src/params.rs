use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Career-track choice under noisy information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerParams {
    /// Number of career tracks (J)
    pub num_tracks: usize,
    /// Number of graduates (N)
    pub num_graduates: usize,
    /// Monte-Carlo draws per graduate (K)
    pub num_draws: usize,
    /// Friends of each graduate in each track; graduate i has `friends[i]`
    pub friends: Vec<usize>,
    /// Standard deviation of the utility noise
    pub sigma: f64,
    /// Known value of each track (v_j)
    pub values: Vec<f64>,
    /// Utility cost of leaving the first-year track
    pub switching_cost: f64,
}

impl Default for CareerParams {
    fn default() -> Self {
        let num_graduates = 10;
        CareerParams {
            num_tracks: 3,
            num_graduates,
            num_draws: 10_000,
            friends: (1..=num_graduates).collect(),
            sigma: 2.0,
            values: vec![1.0, 2.0, 3.0],
            switching_cost: 1.0,
        }
    }
}

impl CareerParams {
    /// Same model with a different number of draws
    pub fn with_draws(&self, num_draws: usize) -> Self {
        CareerParams {
            num_draws,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SimulationError::InvalidParameter(msg));

        if self.num_tracks == 0 || self.values.len() != self.num_tracks {
            return invalid(format!(
                "{} track values for {} tracks",
                self.values.len(),
                self.num_tracks
            ));
        }
        if self.friends.len() != self.num_graduates {
            return invalid(format!(
                "{} friend counts for {} graduates",
                self.friends.len(),
                self.num_graduates
            ));
        }
        if self.friends.contains(&0) {
            return invalid("every graduate needs at least one friend per track".to_string());
        }
        if self.num_draws == 0 {
            return invalid("num_draws must be positive".to_string());
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return invalid(format!("track values must be finite, got {:?}", self.values));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return invalid(format!("sigma must be non-negative, got {}", self.sigma));
        }
        if !(self.switching_cost.is_finite() && self.switching_cost >= 0.0) {
            return invalid(format!(
                "switching_cost must be non-negative, got {}",
                self.switching_cost
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graduate_i_has_i_friends() {
        let params = CareerParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.friends, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let params = CareerParams {
            values: vec![1.0, 2.0],
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimulationError::InvalidParameter(_))
        ));

        let params = CareerParams {
            friends: vec![0; 10],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn negative_or_nan_sigma_is_rejected() {
        for sigma in [-1.0, f64::NAN] {
            let params = CareerParams {
                sigma,
                ..Default::default()
            };
            assert!(matches!(
                params.validate(),
                Err(SimulationError::InvalidParameter(_))
            ));
        }
    }
}
