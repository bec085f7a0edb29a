//! Error types for the scenario store layer

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error taxonomy.
///
/// These never escalate past the editor boundary: the session reports a
/// generic operation-failed signal and keeps its local state.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store backend unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Generic error wrapper
    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Create a serialization error
    pub fn serialization<E: std::fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }
}
