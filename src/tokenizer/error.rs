//! Tokenizer error types.

use thiserror::Error;

/// Tokenizer errors
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Missing special token in vocabulary: {0}")]
    MissingSpecialToken(String),

    #[error("Invalid token ID: {0}")]
    InvalidTokenId(u32),

    #[error("Empty vocabulary: {0}")]
    EmptyVocab(String),

    #[error("Sequence length {0} too short for [CLS]/[SEP] framing")]
    SequenceTooShort(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tokenizer operations
pub type Result<T> = std::result::Result<T, TokenizerError>;
