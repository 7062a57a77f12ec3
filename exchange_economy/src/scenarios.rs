//! Equilibria for randomly drawn endowments.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solvers::{EquilibriumResult, EquilibriumSolver, Result};

use crate::model::{Allocation, ExchangeEconomy};
use crate::params::{Bundle, ExchangeParams};

pub const DEFAULT_DRAWS: usize = 50;
pub const DEFAULT_SEED: u64 = 2024;

/// One random endowment for A and the equilibrium it leads to
#[derive(Debug, Clone, PartialEq)]
pub struct EndowmentDraw {
    pub endowment_a: Bundle,
    pub equilibrium: EquilibriumResult<Allocation>,
}

/// `count` endowments for A drawn uniformly from the unit square
pub fn random_endowments(count: usize, seed: u64) -> Vec<Bundle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Bundle::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect()
}

/// Solve the economy once per random endowment, keeping preferences fixed
pub fn random_endowment_equilibria(
    params: &ExchangeParams,
    count: usize,
    seed: u64,
    solver: &EquilibriumSolver,
) -> Result<Vec<EndowmentDraw>> {
    random_endowments(count, seed)
        .into_iter()
        .map(|endowment_a| {
            let economy = ExchangeEconomy::new(params.with_endowment(endowment_a))?;
            let equilibrium = economy.solve_equilibrium(solver)?;
            debug!(
                "endowment ({:.3}, {:.3}): p1 = {:.6}",
                endowment_a.x1,
                endowment_a.x2,
                equilibrium.prices.get(0)
            );
            Ok(EndowmentDraw {
                endowment_a,
                equilibrium,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_solver;

    #[test]
    fn draws_are_reproducible_and_in_the_box() {
        let first = random_endowments(DEFAULT_DRAWS, DEFAULT_SEED);
        let second = random_endowments(DEFAULT_DRAWS, DEFAULT_SEED);
        assert_eq!(first, second);
        assert!(first.iter().all(|w| (0.0..1.0).contains(&w.x1) && (0.0..1.0).contains(&w.x2)));
        assert_ne!(first, random_endowments(DEFAULT_DRAWS, DEFAULT_SEED + 1));
    }

    #[test]
    fn every_draw_clears_both_markets() {
        let draws = random_endowment_equilibria(
            &ExchangeParams::default(),
            DEFAULT_DRAWS,
            DEFAULT_SEED,
            &default_solver(),
        )
        .unwrap();
        assert_eq!(draws.len(), DEFAULT_DRAWS);
        for draw in &draws {
            assert!(draw.equilibrium.clears_markets(1e-4));
            assert!(draw.equilibrium.walras_sum().abs() < 1e-10);
        }
    }
}
