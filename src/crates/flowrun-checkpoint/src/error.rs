//! Error types for state store operations

use thiserror::Error;

/// Result type for state store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading or saving continuation records
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Binary serialization error
    #[error("Binary serialization error: {0}")]
    BinarySerialization(#[from] bincode::Error),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
