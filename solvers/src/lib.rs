//! Numerical kernel shared by the economy models.
//!
//! - `scalar`: grid bracketing, bisection and Brent maximisation in one dimension
//! - `multivariate`: damped Newton for square systems
//! - `equilibrium`: the `Economy` trait and the market-clearing solver
//! - `policy`: outer search over a scalar policy parameter (e.g. a tax rate)

pub mod equilibrium;
pub mod error;
pub mod multivariate;
pub mod policy;
pub mod scalar;

pub use equilibrium::{
    Backend, Economy, EquilibriumResult, EquilibriumSolver, PriceVector, SolverConfig, walras_sum,
};
pub use error::{Result, SolverError};
pub use multivariate::NewtonConfig;
pub use policy::{PolicyOptimizer, PolicyOptimum};
pub use scalar::{GridConfig, MaximizeOptions, RootOptions};
