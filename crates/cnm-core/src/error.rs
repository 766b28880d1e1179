//! Error types for CNM Core

use thiserror::Error;

/// Result type alias using CNM's Error
pub type Result<T> = std::result::Result<T, Error>;

/// CNM core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid node type: {0}")]
    InvalidNodeType(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
