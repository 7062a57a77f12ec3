//! Two-agent Cobb-Douglas exchange economy.
//!
//! Agents A and B split a unit endowment of two goods. Good 2 is the
//! numeraire, so equilibrium reduces to a single price p1 found by grid
//! bracketing and bisection on the excess demand for good 1.

pub mod model;
pub mod params;
pub mod pareto;
pub mod scenarios;

pub use model::{
    default_solver, price_grid, Agent, Allocation, ExchangeEconomy, DEFAULT_PRICE_GRID,
};
pub use params::{Bundle, ExchangeParams};
