//! Error types for mt1d-solver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("singular matrix")]
    SingularMatrix,

    #[error("system is singular at {frequency} Hz")]
    SingularSystem { frequency: f64 },

    #[error("invalid dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("non-physical conductivity {value} in cell {index}")]
    NonPhysicalConductivity { index: usize, value: f64 },

    #[error(transparent)]
    Core(#[from] mt1d_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
