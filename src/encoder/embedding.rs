//! Token and position embeddings.

use super::config::EncoderConfig;
use super::norm::LayerNorm;
use crate::tokenizer::TokenId;

/// Learned token and position embeddings followed by LayerNorm.
#[derive(Debug, Clone)]
pub struct Embeddings {
    /// (vocab_size, hidden_size) row-major
    pub token: Vec<f32>,
    /// (max_position_embeddings, hidden_size) row-major
    pub position: Vec<f32>,
    pub norm: LayerNorm,
    hidden_size: usize,
    vocab_size: usize,
    max_positions: usize,
}

impl Embeddings {
    /// Deterministic small-value initialization.
    #[must_use]
    pub fn new(config: &EncoderConfig) -> Self {
        let scale = 0.02;
        let init = |n: usize, phase: f32| -> Vec<f32> {
            (0..n).map(|i| (i as f32 * phase).sin() * scale).collect()
        };
        Self {
            token: init(config.vocab_size * config.hidden_size, 0.017),
            position: init(config.max_position_embeddings * config.hidden_size, 0.029),
            norm: LayerNorm::new(config.hidden_size, config.layer_norm_eps),
            hidden_size: config.hidden_size,
            vocab_size: config.vocab_size,
            max_positions: config.max_position_embeddings,
        }
    }

    /// Create from pretrained buffers.
    #[must_use]
    pub fn from_parts(
        token: Vec<f32>,
        position: Vec<f32>,
        norm: LayerNorm,
        config: &EncoderConfig,
    ) -> Self {
        Self {
            token,
            position,
            norm,
            hidden_size: config.hidden_size,
            vocab_size: config.vocab_size,
            max_positions: config.max_position_embeddings,
        }
    }

    /// Embed a token sequence into a flattened (seq_len, hidden_size) buffer.
    ///
    /// Out-of-range token IDs or positions contribute zeros and log a
    /// warning rather than aborting the fold.
    #[must_use]
    pub fn forward(&self, ids: &[TokenId]) -> Vec<f32> {
        let h = self.hidden_size;
        let mut out = vec![0.0f32; ids.len() * h];

        for (pos, &id) in ids.iter().enumerate() {
            let row = &mut out[pos * h..(pos + 1) * h];

            if (id as usize) < self.vocab_size {
                let tok = &self.token[id as usize * h..(id as usize + 1) * h];
                for (o, &t) in row.iter_mut().zip(tok.iter()) {
                    *o = t;
                }
            } else {
                eprintln!("token id {id} outside vocabulary ({}), embedding as zeros", self.vocab_size);
            }

            if pos < self.max_positions {
                let p = &self.position[pos * h..(pos + 1) * h];
                for (o, &v) in row.iter_mut().zip(p.iter()) {
                    *o += v;
                }
            } else {
                eprintln!("position {pos} beyond learned range ({}), adding zeros", self.max_positions);
            }
        }

        self.norm.forward_batched(&out, ids.len(), h)
    }
}
