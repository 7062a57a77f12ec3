use solvers::{
    Economy, EquilibriumResult, EquilibriumSolver, GridConfig, PriceVector, Result, SolverConfig,
    SolverError,
};

use crate::params::{Bundle, ExchangeParams};

/// Default p1 search grid: 0.5 + 2i/75 for i = 0..=75
pub const DEFAULT_PRICE_GRID: GridConfig = GridConfig {
    low: 0.5,
    high: 2.5,
    points: 76,
};

/// p1 ∈ {0.5 + 2i/n : i = 0..=n}
pub fn price_grid(n: usize) -> GridConfig {
    GridConfig::new(0.5, 2.5, n + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    A,
    B,
}

/// Closed-form Cobb-Douglas demand: weight × income / price for good 1,
/// the rest of income on good 2.
pub fn cobb_douglas_demand(weight: f64, income: f64, p1: f64, p2: f64) -> Result<Bundle> {
    if !(p1.is_finite() && p1 > 0.0 && p2.is_finite() && p2 > 0.0) {
        return Err(SolverError::invalid(format!(
            "prices must be positive, got p1={p1}, p2={p2}"
        )));
    }
    Ok(Bundle::new(
        weight * income / p1,
        (1.0 - weight) * income / p2,
    ))
}

/// Demands of both agents and the resulting market-clearing errors at a price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub p1: f64,
    pub a: Bundle,
    pub b: Bundle,
    /// Excess demand for good 1 and good 2
    pub excess: [f64; 2],
}

/// Two-agent, two-good exchange economy with good 2 as numeraire
#[derive(Debug, Clone)]
pub struct ExchangeEconomy {
    params: ExchangeParams,
}

impl ExchangeEconomy {
    pub fn new(params: ExchangeParams) -> Result<Self> {
        params.validate()?;
        Ok(ExchangeEconomy { params })
    }

    pub fn params(&self) -> &ExchangeParams {
        &self.params
    }

    pub fn weight(&self, agent: Agent) -> f64 {
        match agent {
            Agent::A => self.params.alpha,
            Agent::B => self.params.beta,
        }
    }

    pub fn endowment(&self, agent: Agent) -> Bundle {
        match agent {
            Agent::A => self.params.endowment_a(),
            Agent::B => self.params.endowment_b(),
        }
    }

    pub fn utility(&self, agent: Agent, bundle: Bundle) -> f64 {
        let weight = self.weight(agent);
        bundle.x1.powf(weight) * bundle.x2.powf(1.0 - weight)
    }

    /// Demand at arbitrary prices for both goods; homogeneous of degree zero
    pub fn demand_at(&self, agent: Agent, p1: f64, p2: f64) -> Result<Bundle> {
        let endowment = self.endowment(agent);
        let income = p1 * endowment.x1 + p2 * endowment.x2;
        cobb_douglas_demand(self.weight(agent), income, p1, p2)
    }

    pub fn demand(&self, agent: Agent, p1: f64) -> Result<Bundle> {
        self.demand_at(agent, p1, 1.0)
    }

    /// Excess demand for both goods at price p1
    pub fn market_clearing_errors(&self, p1: f64) -> Result<(f64, f64)> {
        let allocation = self.allocation(p1)?;
        Ok((allocation.excess[0], allocation.excess[1]))
    }

    pub fn allocation(&self, p1: f64) -> Result<Allocation> {
        let a = self.demand(Agent::A, p1)?;
        let b = self.demand(Agent::B, p1)?;
        Ok(Allocation {
            p1,
            a,
            b,
            excess: [a.x1 + b.x1 - 1.0, a.x2 + b.x2 - 1.0],
        })
    }

    /// Market-clearing errors along a price grid, for plotting
    pub fn clearing_errors_on_grid(&self, grid: &GridConfig) -> Result<Vec<(f64, f64, f64)>> {
        grid.validate()?;
        grid.values()
            .map(|p1| {
                let (e1, e2) = self.market_clearing_errors(p1)?;
                Ok((p1, e1, e2))
            })
            .collect()
    }

    /// Equilibrium p1 from the good-1 clearing condition solved by hand
    pub fn analytical_price(&self) -> f64 {
        let ExchangeParams {
            alpha,
            beta,
            w1a,
            w2a,
        } = self.params;
        (alpha * w2a + beta * (1.0 - w2a)) / (1.0 - alpha * w1a - beta * (1.0 - w1a))
    }

    pub fn solve_equilibrium(
        &self,
        solver: &EquilibriumSolver,
    ) -> Result<EquilibriumResult<Allocation>> {
        solver.solve(self)
    }
}

impl Economy for ExchangeEconomy {
    type Outcome = Allocation;

    fn num_prices(&self) -> usize {
        1
    }

    fn evaluate(&self, prices: &PriceVector) -> Result<Allocation> {
        prices.check_len(1)?;
        self.allocation(prices.get(0))
    }

    fn excess_demand(&self, outcome: &Allocation) -> Vec<f64> {
        outcome.excess.to_vec()
    }

    fn market_prices(&self, prices: &PriceVector) -> Vec<f64> {
        vec![prices.get(0), 1.0]
    }

    fn dropped_market(&self) -> usize {
        1
    }
}

/// Bracket-bisection solver over the default price grid
pub fn default_solver() -> EquilibriumSolver {
    EquilibriumSolver::new(SolverConfig {
        grid: DEFAULT_PRICE_GRID,
        ..SolverConfig::default()
    })
}
