//! Crate-level error types.

use crate::tokenizer::TokenizerError;
use thiserror::Error;

/// Errors produced by corpus loading, weight loading, and training.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
