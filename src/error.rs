//! Error types for the state container.

use thiserror::Error;

/// Main error type for model operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Serialization(e.to_string())
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, StateError>;
