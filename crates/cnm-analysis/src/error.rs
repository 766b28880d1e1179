//! Analysis error types

use thiserror::Error;

/// Result type alias for algorithm operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Analysis-specific error types
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Algorithm already registered: {0}")]
    DuplicateAlgorithm(String),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid parameter '{parameter}' for {algorithm}: {reason}")]
    InvalidParameter {
        algorithm: String,
        parameter: String,
        reason: String,
    },

    #[error("Unknown parameter '{parameter}' for {algorithm}")]
    UnknownParameter { algorithm: String, parameter: String },

    #[error("Unknown algorithm category: {0}")]
    UnknownCategory(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] cnm_core::Error),
}
