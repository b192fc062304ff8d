//! Frozen transformer encoder
//!
//! DistilBERT-shaped encoder: learned token and position embeddings,
//! post-norm blocks of masked multi-head self-attention and a GELU
//! feed-forward. Runs inference only; the pooled leading-token state feeds
//! the trainable classification head.

mod attention;
mod block;
mod config;
mod embedding;
mod feedforward;
mod linear;
mod model;
mod norm;
mod weights;

pub use attention::MultiHeadAttention;
pub use block::EncoderBlock;
pub use config::EncoderConfig;
pub use embedding::Embeddings;
pub use feedforward::{gelu, FeedForward};
pub use linear::Linear;
pub use model::Encoder;
pub use norm::LayerNorm;
pub use weights::{load_raw_tensors, RawTensor, WeightRegistry};
