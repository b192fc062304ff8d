//! Backward operation trait for the gradient tape.

/// A node in the backward graph.
///
/// Each differentiable op records one of these on its output tensor. Calling
/// `backward()` propagates the output gradient to the op's inputs and then
/// recurses into their backward ops.
pub trait BackwardOp {
    /// Propagate gradients to this op's inputs.
    fn backward(&self);
}
