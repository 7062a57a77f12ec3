//! Edgeworth-box analyses beyond the Walrasian equilibrium: the set of
//! Pareto improvements on the endowment, A acting as price setter or as
//! market maker, and a utilitarian planner.

use solvers::scalar::{maximize_bounded, MaximizeOptions};
use solvers::{GridConfig, Result, SolverError};

use crate::model::{Agent, ExchangeEconomy};
use crate::params::Bundle;

/// Keeps the search strictly inside the box where Cobb-Douglas utility is smooth
const BOX_MARGIN: f64 = 1e-9;

/// Allocation reached when one side picks the terms of trade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Price of good 1 (None when A dictates the allocation directly)
    pub p1: Option<f64>,
    /// A's bundle; B consumes the complement
    pub a: Bundle,
    pub utility_a: f64,
    pub utility_b: f64,
}

impl Outcome {
    fn new(economy: &ExchangeEconomy, p1: Option<f64>, a: Bundle) -> Self {
        Outcome {
            p1,
            a,
            utility_a: economy.utility(Agent::A, a),
            utility_b: economy.utility(Agent::B, a.complement()),
        }
    }

    pub fn b(&self) -> Bundle {
        self.a.complement()
    }

    pub fn aggregate_utility(&self) -> f64 {
        self.utility_a + self.utility_b
    }
}

/// Grid allocations (i/n, j/n) that make neither agent worse off than at the endowment
pub fn pareto_improvements(economy: &ExchangeEconomy, n: usize) -> Vec<Bundle> {
    let reservation_a = economy.utility(Agent::A, economy.endowment(Agent::A));
    let reservation_b = economy.utility(Agent::B, economy.endowment(Agent::B));
    let step = 1.0 / n.max(1) as f64;

    (0..=n)
        .flat_map(|i| (0..=n).map(move |j| Bundle::new(i as f64 * step, j as f64 * step)))
        .filter(|a| {
            economy.utility(Agent::A, *a) >= reservation_a
                && economy.utility(Agent::B, a.complement()) >= reservation_b
        })
        .collect()
}

/// A's bundle when B demands at price p1 and A takes the rest, if feasible
fn residual_for_a(economy: &ExchangeEconomy, p1: f64) -> Result<Option<Bundle>> {
    let b = economy.demand(Agent::B, p1)?;
    let a = b.complement();
    Ok(a.is_feasible().then_some(a))
}

/// A picks the price from a grid, B is a price taker
pub fn price_setter_on_grid(economy: &ExchangeEconomy, grid: &GridConfig) -> Result<Outcome> {
    grid.validate()?;
    let mut best: Option<Outcome> = None;

    for p1 in grid.values() {
        if let Some(a) = residual_for_a(economy, p1)? {
            let candidate = Outcome::new(economy, Some(p1), a);
            if best.map_or(true, |b| candidate.utility_a > b.utility_a) {
                best = Some(candidate);
            }
        }
    }

    best.ok_or_else(|| {
        SolverError::invalid(format!(
            "no feasible price on [{}, {}] for the price setter",
            grid.low, grid.high
        ))
    })
}

/// A picks any price in `[low, high]`, B is a price taker
pub fn price_setter_continuous(economy: &ExchangeEconomy, low: f64, high: f64) -> Result<Outcome> {
    let objective = |p1: f64| match residual_for_a(economy, p1) {
        Ok(Some(a)) => economy.utility(Agent::A, a),
        _ => f64::NEG_INFINITY,
    };
    let maximum = maximize_bounded(objective, low, high, &MaximizeOptions::default())?;
    match residual_for_a(economy, maximum.x)? {
        Some(a) => Ok(Outcome::new(economy, Some(maximum.x), a)),
        None => Err(SolverError::invalid(format!(
            "no feasible price on [{low}, {high}] for the price setter"
        ))),
    }
}

/// A chooses the allocation in the Pareto-improvement grid set that is best for A
pub fn market_maker_restricted(economy: &ExchangeEconomy, n: usize) -> Option<Outcome> {
    pareto_improvements(economy, n)
        .into_iter()
        .map(|a| Outcome::new(economy, None, a))
        .max_by(|x, y| x.utility_a.total_cmp(&y.utility_a))
}

/// A chooses any allocation leaving B at least as well off as at the endowment.
///
/// The constraint binds at the optimum, so the search runs along B's
/// reservation indifference curve, parametrised by A's amount of good 1.
pub fn market_maker_unrestricted(economy: &ExchangeEconomy) -> Result<Outcome> {
    let beta = economy.weight(Agent::B);
    let reservation_b = economy.utility(Agent::B, economy.endowment(Agent::B));

    let along_curve = |x1a: f64| -> Option<Bundle> {
        let x1b = 1.0 - x1a;
        let x2b = (reservation_b / x1b.powf(beta)).powf(1.0 / (1.0 - beta));
        let a = Bundle::new(x1a, 1.0 - x2b);
        a.is_feasible().then_some(a)
    };

    let maximum = maximize_bounded(
        |x1a| along_curve(x1a).map_or(f64::NEG_INFINITY, |a| economy.utility(Agent::A, a)),
        BOX_MARGIN,
        1.0 - BOX_MARGIN,
        &MaximizeOptions::default(),
    )?;

    along_curve(maximum.x)
        .map(|a| Outcome::new(economy, None, a))
        .ok_or_else(|| SolverError::invalid("no allocation keeps B at its reservation utility"))
}

/// Allocation maximising u_A + u_B over the box
pub fn utilitarian_planner(economy: &ExchangeEconomy) -> Result<Outcome> {
    let options = MaximizeOptions::default();
    let aggregate =
        |a: Bundle| economy.utility(Agent::A, a) + economy.utility(Agent::B, a.complement());

    // Inner search over x2A for a given x1A, outer over x1A.
    let best_x2 = |x1a: f64| {
        maximize_bounded(
            |x2a| aggregate(Bundle::new(x1a, x2a)),
            BOX_MARGIN,
            1.0 - BOX_MARGIN,
            &options,
        )
    };
    let outer = maximize_bounded(
        |x1a| best_x2(x1a).map_or(f64::NEG_INFINITY, |m| m.value),
        BOX_MARGIN,
        1.0 - BOX_MARGIN,
        &options,
    )?;
    let inner = best_x2(outer.x)?;

    Ok(Outcome::new(economy, None, Bundle::new(outer.x, inner.x)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_PRICE_GRID;
    use crate::params::ExchangeParams;
    use approx::assert_abs_diff_eq;

    fn economy() -> ExchangeEconomy {
        ExchangeEconomy::new(ExchangeParams::default()).unwrap()
    }

    /// Marginal rate of substitution of good 1 for good 2
    fn mrs(weight: f64, bundle: Bundle) -> f64 {
        weight / (1.0 - weight) * bundle.x2 / bundle.x1
    }

    #[test]
    fn pareto_set_contains_only_improvements() {
        let economy = economy();
        let set = pareto_improvements(&economy, 75);
        assert!(!set.is_empty());
        let ua0 = economy.utility(Agent::A, economy.endowment(Agent::A));
        let ub0 = economy.utility(Agent::B, economy.endowment(Agent::B));
        for a in &set {
            assert!(economy.utility(Agent::A, *a) >= ua0);
            assert!(economy.utility(Agent::B, a.complement()) >= ub0);
        }
    }

    #[test]
    fn price_setter_beats_walrasian_outcome_for_a() {
        let economy = economy();
        let walras = economy.allocation(economy.analytical_price()).unwrap();
        let u_walras = economy.utility(Agent::A, walras.a);

        let grid = price_setter_on_grid(&economy, &DEFAULT_PRICE_GRID).unwrap();
        let continuous = price_setter_continuous(&economy, 1e-4, 10.0).unwrap();

        assert!(grid.utility_a >= u_walras);
        assert!(continuous.utility_a >= grid.utility_a - 1e-9);
    }

    #[test]
    fn unrestricted_market_maker_keeps_b_indifferent() {
        let economy = economy();
        let outcome = market_maker_unrestricted(&economy).unwrap();
        let ub0 = economy.utility(Agent::B, economy.endowment(Agent::B));
        assert_abs_diff_eq!(outcome.utility_b, ub0, epsilon = 1e-9);

        // Tangency with B's indifference curve
        assert_abs_diff_eq!(
            mrs(economy.weight(Agent::A), outcome.a),
            mrs(economy.weight(Agent::B), outcome.b()),
            epsilon = 1e-4
        );

        let restricted = market_maker_restricted(&economy, 75).unwrap();
        assert!(outcome.utility_a >= restricted.utility_a - 1e-9);
    }

    #[test]
    fn utilitarian_allocation_is_pareto_efficient() {
        let economy = economy();
        let outcome = utilitarian_planner(&economy).unwrap();
        assert_abs_diff_eq!(
            mrs(economy.weight(Agent::A), outcome.a),
            mrs(economy.weight(Agent::B), outcome.b()),
            epsilon = 1e-3
        );
    }
}
