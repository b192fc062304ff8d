//! Encoder block: attention and feed-forward with post-norm residuals.

use super::attention::MultiHeadAttention;
use super::config::EncoderConfig;
use super::feedforward::FeedForward;
use super::norm::LayerNorm;

/// One transformer encoder block.
///
/// Post-norm layout: residual is added before each LayerNorm, matching the
/// DistilBERT checkpoint this loads.
#[derive(Debug, Clone)]
pub struct EncoderBlock {
    pub attention: MultiHeadAttention,
    pub sa_norm: LayerNorm,
    pub ffn: FeedForward,
    pub out_norm: LayerNorm,
    hidden_size: usize,
}

impl EncoderBlock {
    /// Create with deterministic initialization.
    #[must_use]
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            attention: MultiHeadAttention::new(config),
            sa_norm: LayerNorm::new(config.hidden_size, config.layer_norm_eps),
            ffn: FeedForward::new(config),
            out_norm: LayerNorm::new(config.hidden_size, config.layer_norm_eps),
            hidden_size: config.hidden_size,
        }
    }

    /// Create from pretrained sublayers.
    #[must_use]
    pub fn from_parts(
        attention: MultiHeadAttention,
        sa_norm: LayerNorm,
        ffn: FeedForward,
        out_norm: LayerNorm,
        config: &EncoderConfig,
    ) -> Self {
        Self {
            attention,
            sa_norm,
            ffn,
            out_norm,
            hidden_size: config.hidden_size,
        }
    }

    /// Forward over a flattened (seq_len, hidden_size) input.
    #[must_use]
    pub fn forward(&self, x: &[f32], seq_len: usize, attention_mask: &[u8]) -> Vec<f32> {
        let h = self.hidden_size;

        let attn_out = self.attention.forward(x, seq_len, attention_mask);
        let residual: Vec<f32> = x.iter().zip(attn_out.iter()).map(|(a, b)| a + b).collect();
        let normed = self.sa_norm.forward_batched(&residual, seq_len, h);

        let ffn_out = self.ffn.forward(&normed, seq_len);
        let residual: Vec<f32> = normed
            .iter()
            .zip(ffn_out.iter())
            .map(|(a, b)| a + b)
            .collect();
        self.out_norm.forward_batched(&residual, seq_len, h)
    }
}
