//! Head training over pooled encoder outputs
//!
//! The encoder is frozen, so each fold pre-computes pooled features once
//! and the epoch loop trains only the classification head.

mod loss;
mod trainer;

pub use loss::{log_softmax, logit_grad, nll_loss};
pub use trainer::{FoldResult, FoldTrainer, PooledExample, TrainingConfig};
