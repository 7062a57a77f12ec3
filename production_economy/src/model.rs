use log::debug;
use serde::Serialize;
use solvers::scalar::{find_root_on_grid, RootOptions};
use solvers::{
    Economy, EquilibriumResult, EquilibriumSolver, GridConfig, NewtonConfig, PriceVector, Result,
    SolverConfig,
};

use crate::consumer::{optimal_labor, ConsumerChoice};
use crate::firm::{firm_output, FirmChoice};
use crate::params::ModelParams;

/// Labour is the numeraire
pub const WAGE: f64 = 1.0;

/// Market order used for excess demands: labour, good 1, good 2
pub const LABOR_MARKET: usize = 0;

const TRANSFER_GRID_POINTS: usize = 16;

const TRANSFER_ROOT: RootOptions = RootOptions {
    x_tol: 1e-12,
    f_tol: 1e-14,
    max_iter: 200,
};

/// Everything the economy does at a pair of goods prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketOutcome {
    pub p1: f64,
    pub p2: f64,
    pub tau: f64,
    /// Lump-sum rebate of the tax revenue
    pub transfer: f64,
    pub firm1: FirmChoice,
    pub firm2: FirmChoice,
    pub consumer: ConsumerChoice,
    /// Excess demand for labour, good 1 and good 2
    pub excess: [f64; 3],
}

impl MarketOutcome {
    pub fn profits(&self) -> f64 {
        self.firm1.profit + self.firm2.profit
    }

    pub fn tax_revenue(&self) -> f64 {
        self.tau * self.consumer.c2
    }

    /// Transfer minus tax revenue; zero when the government budget balances
    pub fn budget_gap(&self) -> f64 {
        self.transfer - self.tax_revenue()
    }

    /// Fraction of hired labour working in the good-1 firm
    pub fn labor_share_good1(&self) -> f64 {
        self.firm1.labor / (self.firm1.labor + self.firm2.labor)
    }
}

/// A (p1, p2) node of the clearing check and its three market errors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClearingCheck {
    pub p1: f64,
    pub p2: f64,
    pub errors: [f64; 3],
}

impl ClearingCheck {
    pub fn max_error(&self) -> f64 {
        self.errors.iter().fold(0.0_f64, |acc, e| acc.max(e.abs()))
    }
}

/// Two firms, one consumer supplying labour, a tax on good 2
#[derive(Debug, Clone)]
pub struct ProductionEconomy {
    params: ModelParams,
}

impl ProductionEconomy {
    pub fn new(params: ModelParams) -> Result<Self> {
        params.validate()?;
        Ok(ProductionEconomy { params })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn with_tax(&self, tau: f64) -> Result<Self> {
        ProductionEconomy::new(self.params.with_tax(tau))
    }

    /// Transfer T solving T = τ·c2(T), where c2 depends on T through
    /// income and hours worked.
    ///
    /// τ·c2(T) − T is non-negative at T = 0 and falls with slope below one,
    /// so the grid scan over [0, T_max] always finds the root.
    pub fn balanced_transfer(&self, p1: f64, p2: f64, profits: f64) -> Result<f64> {
        let params = &self.params;
        let tau = params.tau;
        if tau == 0.0 {
            return Ok(0.0);
        }

        // Fraction of income that comes back as tax revenue
        let share = tau * (1.0 - params.alpha) / (p2 + tau);
        let high = 1.5 * share * (params.max_labor() + profits) / (1.0 - share) + 1e-9;
        let grid = GridConfig::new(0.0, high, TRANSFER_GRID_POINTS);

        let mut revenue_gap = |transfer: f64| -> Result<f64> {
            let choice = optimal_labor(p1, p2, profits + transfer, params)?;
            Ok(tau * choice.c2 - transfer)
        };
        let root = find_root_on_grid(&mut revenue_gap, &grid, &TRANSFER_ROOT)?;
        Ok(root.x)
    }

    /// Firm choices, the balanced transfer, the consumer's choice and the
    /// market errors at goods prices (p1, p2).
    pub fn outcome_at(&self, p1: f64, p2: f64) -> Result<MarketOutcome> {
        let firm1 = firm_output(p1, WAGE, &self.params)?;
        let firm2 = firm_output(p2, WAGE, &self.params)?;
        let profits = firm1.profit + firm2.profit;

        let transfer = self.balanced_transfer(p1, p2, profits)?;
        let consumer = optimal_labor(p1, p2, profits + transfer, &self.params)?;

        Ok(MarketOutcome {
            p1,
            p2,
            tau: self.params.tau,
            transfer,
            firm1,
            firm2,
            consumer,
            excess: [
                firm1.labor + firm2.labor - consumer.labor,
                consumer.c1 - firm1.output,
                consumer.c2 - firm2.output,
            ],
        })
    }

    /// Market errors on every (p1, p2) pair of `grid` × `grid`, keeping the
    /// pairs where all three markets are within `threshold` of clearing
    pub fn check_market_clearing_grid(
        &self,
        grid: &GridConfig,
        threshold: f64,
    ) -> Result<Vec<ClearingCheck>> {
        grid.validate()?;
        let mut passing = Vec::new();
        for p1 in grid.values() {
            for p2 in grid.values() {
                let outcome = self.outcome_at(p1, p2)?;
                let check = ClearingCheck {
                    p1,
                    p2,
                    errors: outcome.excess,
                };
                if check.max_error() < threshold {
                    passing.push(check);
                }
            }
        }
        debug!(
            "{} of {} price pairs clear within {threshold}",
            passing.len(),
            grid.points * grid.points
        );
        Ok(passing)
    }

    pub fn solve_equilibrium(
        &self,
        solver: &EquilibriumSolver,
    ) -> Result<EquilibriumResult<MarketOutcome>> {
        solver.solve(self)
    }
}

impl Economy for ProductionEconomy {
    type Outcome = MarketOutcome;

    fn num_prices(&self) -> usize {
        2
    }

    fn evaluate(&self, prices: &PriceVector) -> Result<MarketOutcome> {
        prices.check_len(2)?;
        self.outcome_at(prices.get(0), prices.get(1))
    }

    fn excess_demand(&self, outcome: &MarketOutcome) -> Vec<f64> {
        outcome.excess.to_vec()
    }

    fn market_prices(&self, prices: &PriceVector) -> Vec<f64> {
        vec![WAGE, prices.get(0), prices.get(1)]
    }

    fn dropped_market(&self) -> usize {
        LABOR_MARKET
    }
}

/// Newton solver with tolerances matched to the accuracy of the nested
/// labour-supply search
pub fn default_solver() -> EquilibriumSolver {
    EquilibriumSolver::new(SolverConfig {
        newton: NewtonConfig {
            tol: 1e-7,
            fd_step: 1e-5,
            ..NewtonConfig::default()
        },
        ..SolverConfig::default()
    })
}
