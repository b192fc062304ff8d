//! WordPiece tokenization and fixed-length sequence encoding
//!
//! Loads a pretrained `vocab.txt` (token ID = line number), applies basic
//! lowercasing and punctuation splitting, then greedy longest-match
//! WordPiece with `##` continuation pieces. [`SequenceEncoder`] frames the
//! result with [CLS]/[SEP] and pads to a fixed length with an attention
//! mask.

mod encode;
mod error;
mod wordpiece;

pub use encode::{EncodedSequence, SequenceEncoder};
pub use error::{Result, TokenizerError};
pub use wordpiece::WordPieceTokenizer;

/// Token ID type
pub type TokenId = u32;

/// Tokenizer trait
pub trait Tokenizer: Send + Sync {
    /// Encode text to token IDs
    fn encode(&self, text: &str) -> Vec<TokenId>;

    /// Decode token IDs to text
    fn decode(&self, ids: &[TokenId]) -> Result<String>;

    /// Get vocabulary size
    fn vocab_size(&self) -> usize;

    /// Get token for ID
    fn id_to_token(&self, id: TokenId) -> Option<&str>;

    /// Get ID for token
    fn token_to_id(&self, token: &str) -> Option<TokenId>;
}
