//! Gradient-tracking tensor over a flat `ndarray` buffer.

use super::backward::BackwardOp;
use ndarray::Array1;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// A 1-D `f32` tensor with shared interior state.
///
/// Cloning a `Tensor` is cheap and aliases the same data and gradient
/// buffers, which lets backward ops hold their inputs and accumulate
/// gradients that the optimizer later reads through the original handle.
/// Matrix-shaped values are stored flattened row-major; ops take explicit
/// dimensions.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<RefCell<Array1<f32>>>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    requires_grad: Rc<RefCell<bool>>,
    backward_op: Rc<RefCell<Option<Rc<dyn BackwardOp>>>>,
}

impl Tensor {
    /// Create a tensor from an ndarray buffer.
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
            grad: Rc::new(RefCell::new(None)),
            requires_grad: Rc::new(RefCell::new(requires_grad)),
            backward_op: Rc::new(RefCell::new(None)),
        }
    }

    /// Create a tensor from a `Vec<f32>`.
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor.
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Create a one-filled tensor.
    pub fn ones(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::ones(len), requires_grad)
    }

    /// Borrow the underlying data.
    pub fn data(&self) -> Ref<'_, Array1<f32>> {
        self.data.borrow()
    }

    /// Mutably borrow the underlying data.
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        self.data.borrow_mut()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether gradients are tracked for this tensor.
    #[must_use]
    pub fn requires_grad(&self) -> bool {
        *self.requires_grad.borrow()
    }

    /// Enable or disable gradient tracking.
    pub fn set_requires_grad(&self, requires_grad: bool) {
        *self.requires_grad.borrow_mut() = requires_grad;
    }

    /// Clone of the current gradient, if any.
    #[must_use]
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Shared handle to the gradient cell, used by backward ops.
    #[must_use]
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// Replace the gradient.
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add to the gradient, initializing it on first accumulation.
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient.
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// The backward op producing this tensor, if it was built on the tape.
    #[must_use]
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.borrow().clone()
    }

    /// Attach the backward op for this tensor.
    pub fn set_backward_op(&self, op: Rc<dyn BackwardOp>) {
        *self.backward_op.borrow_mut() = Some(op);
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.len())
            .field("requires_grad", &self.requires_grad())
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}
