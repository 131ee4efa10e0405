//! Error types for mt1d-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("value {value} at index {index} is outside the mapping domain")]
    MappingDomain { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
