//! Tape-based autograd engine
//!
//! Reverse-mode automatic differentiation over flat `f32` tensors. The op
//! set covers exactly what the classification head trains through: matmul,
//! bias addition, ReLU, and dropout. The frozen encoder forward uses the
//! plain [`ops::matmul_compute`] kernel without building a tape.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub use ops::{add_bias, dropout, matmul, matmul_compute, relu, transpose};
pub use tensor::Tensor;

/// Perform backward pass on a tensor
pub fn backward(tensor: &Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        // Initialize with ones for scalar loss
        let ones = ndarray::Array1::ones(tensor.len());
        tensor.set_grad(ones);
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}
