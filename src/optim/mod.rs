//! Optimizers for head training.

mod adamw;
mod optimizer;

pub use adamw::AdamW;
pub use optimizer::Optimizer;
