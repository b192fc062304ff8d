//! Activation autograd operations.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let requires_grad = a.requires_grad();

    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReluBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReluBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * (a > 0)
                let grad_a = grad * &self.a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;

    #[test]
    fn test_relu_forward() {
        let a = Tensor::from_vec(vec![-1.0, 0.0, 2.0], false);
        let out = relu(&a);
        assert_eq!(out.data().to_vec(), vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_relu_backward_masks_negatives() {
        let a = Tensor::from_vec(vec![-1.0, 3.0, -0.5, 4.0], true);
        let out = relu(&a);
        backward(&out, Some(Array1::from(vec![1.0, 1.0, 1.0, 1.0])));
        let grad = a.grad().unwrap();
        assert_eq!(grad.to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }
}
