//! Career simulation errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Noise distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
