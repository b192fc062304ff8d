//! Fake-news vs. satire classification fine-tuning
//!
//! Fine-tunes a classification head on top of a frozen pretrained
//! transformer encoder, evaluated with stratified k-fold cross-validation.
//!
//! # Pipeline
//!
//! ```text
//! fakes.tsv + satires.tsv
//!   → labeled, shuffled corpus
//!   → stratified k-fold splits
//!   → per fold: tokenize → frozen encoder → pooled [CLS] state
//!             → classification head (linear → ReLU → dropout → linear)
//!             → NLL loss → AdamW
//!   → per-fold weighted F1 / accuracy / loss, aggregated mean and std
//! ```
//!
//! The encoder forward pass is inference-only; gradients flow through the
//! head via the tape-based [`autograd`] engine.

pub mod autograd;
pub mod corpus;
pub mod device;
pub mod encoder;
mod error;
pub mod eval;
pub mod experiment;
pub mod head;
pub mod kfold;
pub mod optim;
pub mod tokenizer;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
