//! Differentiable operations.

mod activations;
mod bias;
mod dropout;
mod matmul;

pub use activations::relu;
pub use bias::add_bias;
pub use dropout::dropout;
pub use matmul::{matmul, matmul_compute, transpose};
