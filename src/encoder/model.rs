//! The full transformer encoder.

use super::block::EncoderBlock;
use super::config::EncoderConfig;
use super::embedding::Embeddings;
use super::feedforward::FeedForward;
use super::linear::Linear;
use super::norm::LayerNorm;
use super::weights::{load_raw_tensors, take_linear_weight, take_tensor};
use super::MultiHeadAttention;
use crate::tokenizer::EncodedSequence;
use crate::Result;
use std::path::Path;

/// Frozen transformer encoder.
///
/// Produces contextual hidden states for a padded token sequence. All
/// weights are inference-only; gradient flow starts at the pooled output.
pub struct Encoder {
    config: EncoderConfig,
    embeddings: Embeddings,
    blocks: Vec<EncoderBlock>,
}

impl Encoder {
    /// Create with deterministic initialization, mainly for tests.
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let blocks = (0..config.num_layers)
            .map(|_| EncoderBlock::new(&config))
            .collect();
        Ok(Self {
            embeddings: Embeddings::new(&config),
            config,
            blocks,
        })
    }

    /// Load pretrained weights from a SafeTensors checkpoint.
    pub fn from_pretrained(model_path: &Path, config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let tensors = load_raw_tensors(model_path)?;
        let h = config.hidden_size;

        let embeddings = Embeddings::from_parts(
            take_tensor(
                &tensors,
                "embeddings.word_embeddings.weight",
                config.vocab_size * h,
            )?,
            take_tensor(
                &tensors,
                "embeddings.position_embeddings.weight",
                config.max_position_embeddings * h,
            )?,
            LayerNorm::from_parts(
                take_tensor(&tensors, "embeddings.LayerNorm.weight", h)?,
                take_tensor(&tensors, "embeddings.LayerNorm.bias", h)?,
                config.layer_norm_eps,
            ),
            &config,
        );

        let mut blocks = Vec::with_capacity(config.num_layers);
        for i in 0..config.num_layers {
            let prefix = format!("transformer.layer.{i}");
            let proj = |name: &str| -> Result<Linear> {
                Ok(Linear::from_parts(
                    take_linear_weight(&tensors, &format!("{prefix}.{name}.weight"), h, h)?,
                    take_tensor(&tensors, &format!("{prefix}.{name}.bias"), h)?,
                    h,
                    h,
                ))
            };

            let attention = MultiHeadAttention::from_parts(
                proj("attention.q_lin")?,
                proj("attention.k_lin")?,
                proj("attention.v_lin")?,
                proj("attention.out_lin")?,
                &config,
            );

            let sa_norm = LayerNorm::from_parts(
                take_tensor(&tensors, &format!("{prefix}.sa_layer_norm.weight"), h)?,
                take_tensor(&tensors, &format!("{prefix}.sa_layer_norm.bias"), h)?,
                config.layer_norm_eps,
            );

            let ffn = FeedForward::from_parts(
                Linear::from_parts(
                    take_linear_weight(
                        &tensors,
                        &format!("{prefix}.ffn.lin1.weight"),
                        h,
                        config.ffn_size,
                    )?,
                    take_tensor(&tensors, &format!("{prefix}.ffn.lin1.bias"), config.ffn_size)?,
                    h,
                    config.ffn_size,
                ),
                Linear::from_parts(
                    take_linear_weight(
                        &tensors,
                        &format!("{prefix}.ffn.lin2.weight"),
                        config.ffn_size,
                        h,
                    )?,
                    take_tensor(&tensors, &format!("{prefix}.ffn.lin2.bias"), h)?,
                    config.ffn_size,
                    h,
                ),
            );

            let out_norm = LayerNorm::from_parts(
                take_tensor(&tensors, &format!("{prefix}.output_layer_norm.weight"), h)?,
                take_tensor(&tensors, &format!("{prefix}.output_layer_norm.bias"), h)?,
                config.layer_norm_eps,
            );

            blocks.push(EncoderBlock::from_parts(
                attention, sa_norm, ffn, out_norm, &config,
            ));
        }

        Ok(Self {
            config,
            embeddings,
            blocks,
        })
    }

    /// The encoder configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Hidden states for one padded sequence, flattened (seq_len, hidden).
    #[must_use]
    pub fn forward_hidden(&self, seq: &EncodedSequence) -> Vec<f32> {
        let seq_len = seq.ids.len();
        let mut hidden = self.embeddings.forward(&seq.ids);
        for block in &self.blocks {
            hidden = block.forward(&hidden, seq_len, &seq.attention_mask);
        }
        hidden
    }

    /// Pooled representation: the hidden state of the leading [CLS] token.
    #[must_use]
    pub fn pooled(&self, seq: &EncodedSequence) -> Vec<f32> {
        let hidden = self.forward_hidden(seq);
        hidden[..self.config.hidden_size].to_vec()
    }
}
