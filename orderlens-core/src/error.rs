//! Core error types for `orderlens`.

use thiserror::Error;

/// Core error type for `orderlens` domain operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Text that does not have the `NNN-NNNNNNN-NNNNNNN` order id shape.
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
