//! Market-clearing price search.
//!
//! An [`Economy`] maps a vector of non-numeraire prices to a market outcome
//! and its excess demands. [`EquilibriumSolver`] drops the market that Walras'
//! law makes redundant and drives the remaining excess demands to zero, using
//! grid bracketing plus bisection for one unknown price and damped Newton for
//! two or more.

use log::{debug, warn};

use crate::error::{Result, SolverError};
use crate::multivariate::{NewtonConfig, newton_solve};
use crate::scalar::{GridConfig, RootOptions, find_root_on_grid};

/// Non-numeraire prices, all strictly positive. The numeraire is implicit at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceVector(Vec<f64>);

impl PriceVector {
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(SolverError::invalid(format!(
                "prices must be positive and finite, got {bad}"
            )));
        }
        Ok(PriceVector(prices))
    }

    pub fn single(price: f64) -> Result<Self> {
        Self::new(vec![price])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Panics if `index` is out of range; call [`PriceVector::check_len`] first
    /// when the length comes from outside.
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn check_len(&self, expected: usize) -> Result<()> {
        if self.0.len() != expected {
            return Err(SolverError::invalid(format!(
                "expected {expected} prices, got {}",
                self.0.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A small economy whose market-clearing prices are sought.
///
/// Implementations are pure: `evaluate` depends only on `self` and the
/// prices passed in.
pub trait Economy {
    /// Demands, firm choices and anything else derived at a price vector
    type Outcome;

    /// Number of unknown (non-numeraire) prices
    fn num_prices(&self) -> usize;

    fn evaluate(&self, prices: &PriceVector) -> Result<Self::Outcome>;

    /// Excess demand of every market, in market order
    fn excess_demand(&self, outcome: &Self::Outcome) -> Vec<f64>;

    /// Price of every market (numeraire included), in market order
    fn market_prices(&self, prices: &PriceVector) -> Vec<f64>;

    /// Index of the market left out of the solve
    fn dropped_market(&self) -> usize;

    fn initial_guess(&self) -> Vec<f64> {
        vec![1.0; self.num_prices()]
    }
}

/// Price-weighted sum of excess demands; zero by Walras' law
pub fn walras_sum(market_prices: &[f64], excess_demand: &[f64]) -> f64 {
    market_prices
        .iter()
        .zip(excess_demand)
        .map(|(p, z)| p * z)
        .sum()
}

/// Evaluate an economy and return the outcome with the independent excess demands
pub fn reduced_excess_demand<E: Economy>(
    economy: &E,
    prices: &PriceVector,
) -> Result<(E::Outcome, Vec<f64>)> {
    prices.check_len(economy.num_prices())?;
    let outcome = economy.evaluate(prices)?;
    let dropped = economy.dropped_market();
    let excess = economy.excess_demand(&outcome);
    if excess.len() != prices.len() + 1 || dropped >= excess.len() {
        return Err(SolverError::invalid(format!(
            "{} excess demands for {} prices with dropped market {dropped}",
            excess.len(),
            prices.len()
        )));
    }
    let reduced = excess
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != dropped)
        .map(|(_, z)| z)
        .collect();
    Ok((outcome, reduced))
}

/// Numerical backend used for a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Grid scan for a sign change followed by bisection
    BracketBisection,
    /// Damped Newton with a finite-difference Jacobian
    Newton,
}

impl Backend {
    pub fn for_dimension(num_prices: usize) -> Self {
        if num_prices == 1 {
            Backend::BracketBisection
        } else {
            Backend::Newton
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Price search interval for the one-price case
    pub grid: GridConfig,
    pub root: RootOptions,
    pub newton: NewtonConfig,
    /// How many times a failed grid scan is retried at double resolution
    pub max_grid_refinements: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            grid: GridConfig::default(),
            root: RootOptions::default(),
            newton: NewtonConfig::default(),
            max_grid_refinements: 2,
        }
    }
}

/// Prices that clear the independent markets, with the outcome at those prices
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumResult<O> {
    pub prices: PriceVector,
    pub outcome: O,
    /// Excess demand of every market, dropped one included
    pub excess_demand: Vec<f64>,
    /// Price of every market, numeraire included
    pub market_prices: Vec<f64>,
    /// Max-abs excess demand over the independent markets
    pub residual: f64,
    pub iterations: usize,
    pub backend: Backend,
}

impl<O> EquilibriumResult<O> {
    pub fn walras_sum(&self) -> f64 {
        walras_sum(&self.market_prices, &self.excess_demand)
    }

    /// Largest |excess demand| over all markets
    pub fn max_excess_demand(&self) -> f64 {
        self.excess_demand
            .iter()
            .fold(0.0_f64, |acc, z| acc.max(z.abs()))
    }

    pub fn clears_markets(&self, tol: f64) -> bool {
        self.max_excess_demand() <= tol
    }
}

/// Equilibrium price search with a backend chosen by dimension
#[derive(Debug, Clone, Default)]
pub struct EquilibriumSolver {
    config: SolverConfig,
}

impl EquilibriumSolver {
    pub fn new(config: SolverConfig) -> Self {
        EquilibriumSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve<E: Economy>(&self, economy: &E) -> Result<EquilibriumResult<E::Outcome>> {
        match economy.num_prices() {
            0 => Err(SolverError::invalid(
                "economy has no unknown prices to solve for",
            )),
            n => self.solve_with(economy, Backend::for_dimension(n)),
        }
    }

    /// Solve with an explicit backend. Bracket-bisection needs exactly one unknown price.
    pub fn solve_with<E: Economy>(
        &self,
        economy: &E,
        backend: Backend,
    ) -> Result<EquilibriumResult<E::Outcome>> {
        let (prices, iterations) = match backend {
            Backend::BracketBisection => self.search_scalar(economy)?,
            Backend::Newton => self.search_newton(economy)?,
        };

        let (outcome, reduced) = reduced_excess_demand(economy, &prices)?;
        let residual = reduced.iter().fold(0.0_f64, |acc, z| acc.max(z.abs()));
        let excess_demand = economy.excess_demand(&outcome);
        let market_prices = economy.market_prices(&prices);
        debug!(
            "equilibrium at {:?} via {backend:?}: residual {residual:.3e}, walras sum {:.3e}",
            prices.as_slice(),
            walras_sum(&market_prices, &excess_demand)
        );

        Ok(EquilibriumResult {
            prices,
            outcome,
            excess_demand,
            market_prices,
            residual,
            iterations,
            backend,
        })
    }

    fn search_scalar<E: Economy>(&self, economy: &E) -> Result<(PriceVector, usize)> {
        if economy.num_prices() != 1 {
            return Err(SolverError::invalid(format!(
                "bracket-bisection solves one unknown price, economy has {}",
                economy.num_prices()
            )));
        }

        let mut f = |p: f64| -> Result<f64> {
            let prices = PriceVector::single(p)?;
            let (_, reduced) = reduced_excess_demand(economy, &prices)?;
            Ok(reduced[0])
        };

        let mut grid = self.config.grid;
        let mut refinements = 0;
        loop {
            match find_root_on_grid(&mut f, &grid, &self.config.root) {
                Ok(root) => return Ok((PriceVector::single(root.x)?, root.iterations)),
                Err(SolverError::BracketNotFound { .. })
                    if refinements < self.config.max_grid_refinements =>
                {
                    refinements += 1;
                    warn!(
                        "no sign change on [{}, {}] with {} points, retrying at double resolution",
                        grid.low, grid.high, grid.points
                    );
                    grid = grid.refined();
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn search_newton<E: Economy>(&self, economy: &E) -> Result<(PriceVector, usize)> {
        let mut f = |x: &[f64]| -> Result<Vec<f64>> {
            let prices = PriceVector::new(x.to_vec())?;
            let (_, reduced) = reduced_excess_demand(economy, &prices)?;
            Ok(reduced)
        };
        let solution = newton_solve(&mut f, &economy.initial_guess(), &self.config.newton)?;
        Ok((PriceVector::new(solution.x)?, solution.iterations))
    }
}
