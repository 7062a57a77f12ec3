//! Career-track choice with noisy information about track values.

pub mod error;
pub mod params;
pub mod simulation;

pub use error::{Result, SimulationError};
pub use params::CareerParams;
pub use simulation::{
    simulate_known_values, simulate_priors, simulate_with_switching, GraduateSummary,
    KnownValues, SwitchingSummary,
};

/// Seed used by the report binary
pub const DEFAULT_SEED: u64 = 2024;
