pub mod consumer;
pub mod firm;
pub mod model;
pub mod output;
pub mod params;
pub mod taxation;

pub use consumer::ConsumerChoice;
pub use firm::FirmChoice;
pub use model::{default_solver, ClearingCheck, MarketOutcome, ProductionEconomy, WAGE};
pub use params::ModelParams;
pub use taxation::{optimal_tax, social_welfare, tax_sweep, SweepPoint, TaxOptimum};

/// Tax rates scanned by default: 0.0, 0.05, ..., 1.0
pub fn default_tax_grid() -> Vec<f64> {
    (0..=20).map(|i| i as f64 * 0.05).collect()
}
