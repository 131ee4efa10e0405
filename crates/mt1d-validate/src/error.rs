//! Error types for the verification crate.

use thiserror::Error;

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during verification.
#[derive(Debug, Error)]
pub enum Error {
    /// The operator under test failed.
    #[error("solver error: {0}")]
    Solver(#[from] mt1d_solver::Error),

    /// Model or survey setup failed.
    #[error("model error: {0}")]
    Core(#[from] mt1d_core::Error),

    /// Test parameters are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Vector lengths disagree with the operator.
    #[error("invalid dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
