//! Fixed-length sequence encoding with [CLS]/[SEP] framing.

use super::error::{Result, TokenizerError};
use super::wordpiece::WordPieceTokenizer;
use super::{TokenId, Tokenizer};

/// A tokenized, padded input sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    /// Token IDs, exactly `max_len` long
    pub ids: Vec<TokenId>,
    /// 1 for real tokens (including [CLS]/[SEP]), 0 for padding
    pub attention_mask: Vec<u8>,
}

impl EncodedSequence {
    /// Number of non-padding tokens.
    #[must_use]
    pub fn real_len(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Encodes raw text into fixed-length model input.
///
/// Text tokens beyond `max_len - 2` are truncated so that [CLS] and [SEP]
/// always fit.
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    tokenizer: WordPieceTokenizer,
    max_len: usize,
}

impl SequenceEncoder {
    /// Create an encoder producing sequences of `max_len` tokens.
    pub fn new(tokenizer: WordPieceTokenizer, max_len: usize) -> Result<Self> {
        if max_len < 3 {
            return Err(TokenizerError::SequenceTooShort(max_len));
        }
        Ok(Self { tokenizer, max_len })
    }

    /// Sequence length produced by [`Self::encode`].
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// The underlying tokenizer.
    #[must_use]
    pub fn tokenizer(&self) -> &WordPieceTokenizer {
        &self.tokenizer
    }

    /// Encode one text into a padded sequence.
    #[must_use]
    pub fn encode(&self, text: &str) -> EncodedSequence {
        let mut tokens = self.tokenizer.encode(text);
        tokens.truncate(self.max_len - 2);

        let mut ids = Vec::with_capacity(self.max_len);
        ids.push(self.tokenizer.cls_id());
        ids.extend_from_slice(&tokens);
        ids.push(self.tokenizer.sep_id());

        let real = ids.len();
        let mut attention_mask = vec![1u8; real];
        ids.resize(self.max_len, self.tokenizer.pad_id());
        attention_mask.resize(self.max_len, 0);

        EncodedSequence {
            ids,
            attention_mask,
        }
    }

    /// Encode a batch of texts.
    #[must_use]
    pub fn encode_batch(&self, texts: &[&str]) -> Vec<EncodedSequence> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}
