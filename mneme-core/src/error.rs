//! Error types for Mneme operations

use crate::codec::DecodeError;

/// Result type for Mneme operations
pub type Result<T> = std::result::Result<T, MnemeError>;

/// Error types for the Mneme cache and its instrumentation
#[derive(Debug, thiserror::Error)]
pub enum MnemeError {
    /// The underlying store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored value could not be converted to the requested type
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type for key '{key}': operation not permitted on the stored value")]
    WrongType { key: String },

    /// Increment on a value that is not an integer
    #[error("Value at key '{key}' is not an integer")]
    NotAnInteger { key: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for MnemeError {
    fn from(s: String) -> Self {
        MnemeError::Other(s)
    }
}

impl From<&str> for MnemeError {
    fn from(s: &str) -> Self {
        MnemeError::Other(s.to_string())
    }
}

