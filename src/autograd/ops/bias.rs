//! Row-broadcast bias addition.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Add a bias vector to every row of a flattened (rows x n) matrix.
///
/// The bias gradient is the column sum of the output gradient, so a single
/// bias parameter serves the whole batch.
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, n: usize) -> Tensor {
    assert_eq!(x.len(), rows * n, "input size mismatch");
    assert_eq!(bias.len(), n, "bias size mismatch");

    let mut data = x.data().to_vec();
    {
        let bias_data = bias.data();
        for r in 0..rows {
            for c in 0..n {
                data[r * n + c] += bias_data[c];
            }
        }
    }

    let requires_grad = x.requires_grad() || bias.requires_grad();
    let result = Tensor::from_vec(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            x: x.clone(),
            bias: bias.clone(),
            rows,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    rows: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad_output.clone());
            }

            if self.bias.requires_grad() {
                let mut grad_bias = vec![0.0f32; self.n];
                for r in 0..self.rows {
                    for c in 0..self.n {
                        grad_bias[c] += grad_output[r * self.n + c];
                    }
                }
                self.bias.accumulate_grad(Array1::from(grad_bias));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.bias.backward_op() {
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
    fn test_add_bias_forward() {
        let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], false);
        let bias = Tensor::from_vec(vec![10.0, 20.0], false);
        let out = add_bias(&x, &bias, 2, 2);
        assert_eq!(out.data().to_vec(), vec![11.0, 22.0, 13.0, 24.0]);
    }

    #[test]
    fn test_add_bias_grad_sums_rows() {
        let x = Tensor::from_vec(vec![0.0; 6], true);
        let bias = Tensor::from_vec(vec![0.0; 2], true);
        let out = add_bias(&x, &bias, 3, 2);
        backward(&out, Some(Array1::from(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])));

        assert_eq!(
            x.grad().unwrap().to_vec(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(bias.grad().unwrap().to_vec(), vec![9.0, 12.0]);
    }
}
