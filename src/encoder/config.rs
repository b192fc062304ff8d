//! Encoder configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Transformer encoder geometry and numerics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Vocabulary size
    pub vocab_size: usize,
    /// Hidden dimension
    pub hidden_size: usize,
    /// Number of encoder blocks
    pub num_layers: usize,
    /// Number of attention heads
    pub num_attention_heads: usize,
    /// Feed-forward inner dimension
    pub ffn_size: usize,
    /// Maximum sequence length for learned position embeddings
    pub max_position_embeddings: usize,
    /// LayerNorm epsilon
    pub layer_norm_eps: f32,
}

impl EncoderConfig {
    /// DistilBERT base uncased geometry.
    #[must_use]
    pub fn distilbert_base() -> Self {
        Self {
            vocab_size: 30522,
            hidden_size: 768,
            num_layers: 6,
            num_attention_heads: 12,
            ffn_size: 3072,
            max_position_embeddings: 512,
            layer_norm_eps: 1e-12,
        }
    }

    /// Tiny configuration for tests.
    #[must_use]
    pub fn tiny() -> Self {
        Self {
            vocab_size: 64,
            hidden_size: 16,
            num_layers: 2,
            num_attention_heads: 2,
            ffn_size: 32,
            max_position_embeddings: 16,
            layer_norm_eps: 1e-12,
        }
    }

    /// Dimension of one attention head.
    #[must_use]
    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size % self.num_attention_heads != 0 {
            return Err(Error::ConfigError(format!(
                "hidden_size {} not divisible by num_attention_heads {}",
                self.hidden_size, self.num_attention_heads
            )));
        }
        if self.vocab_size == 0 || self.num_layers == 0 {
            return Err(Error::ConfigError(
                "vocab_size and num_layers must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::distilbert_base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distilbert_base_geometry() {
        let config = EncoderConfig::distilbert_base();
        assert_eq!(config.hidden_size, 768);
        assert_eq!(config.num_layers, 6);
        assert_eq!(config.head_dim(), 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_head_split() {
        let config = EncoderConfig {
            hidden_size: 10,
            num_attention_heads: 3,
            ..EncoderConfig::tiny()
        };
        assert!(config.validate().is_err());
    }
}
