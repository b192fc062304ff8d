//! Inverted dropout.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Inverted dropout.
///
/// During training each element is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)`, so no rescaling is needed at
/// evaluation time. When `training` is false (or `rate` is zero) the input
/// passes through on a fresh tape node with an identity backward.
pub fn dropout(a: &Tensor, rate: f32, training: bool, rng: &mut StdRng) -> Tensor {
    assert!((0.0..1.0).contains(&rate), "dropout rate must be in [0, 1)");

    let mask = if training && rate > 0.0 {
        let keep_scale = 1.0 / (1.0 - rate);
        let mask: Vec<f32> = (0..a.len())
            .map(|_| {
                if rng.gen::<f32>() < rate {
                    0.0
                } else {
                    keep_scale
                }
            })
            .collect();
        Array1::from(mask)
    } else {
        Array1::ones(a.len())
    };

    let data = &*a.data() * &mask;
    let requires_grad = a.requires_grad();
    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(DropoutBackward {
            a: a.clone(),
            mask,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct DropoutBackward {
    a: Tensor,
    mask: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // Same mask as the forward pass
                self.a.accumulate_grad(grad_output * &self.mask);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}
