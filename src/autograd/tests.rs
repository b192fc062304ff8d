//! End-to-end gradient checks for the tape.

use super::{add_bias, backward, matmul, relu, Tensor};
use approx::assert_relative_eq;
use ndarray::Array1;

/// Numerical gradient of a scalar-valued function at one parameter index.
fn numerical_grad<F>(param: &Tensor, idx: usize, f: F) -> f32
where
    F: Fn() -> f32,
{
    let eps = 1e-3;
    let original = param.data()[idx];

    param.data_mut()[idx] = original + eps;
    let plus = f();
    param.data_mut()[idx] = original - eps;
    let minus = f();
    param.data_mut()[idx] = original;

    (plus - minus) / (2.0 * eps)
}

#[test]
fn test_matmul_chain_gradients() {
    // y = relu(x @ W + b), loss = sum(y)
    let x = Tensor::from_vec(vec![0.5, -1.0, 2.0, 1.5, 0.0, -0.5], false);
    let w = Tensor::from_vec(vec![0.1, -0.2, 0.3, 0.4, -0.5, 0.6], true);
    let b = Tensor::from_vec(vec![0.05, -0.05], true);

    let run = || {
        let h = matmul(&x, &w, 2, 3, 2);
        let h = add_bias(&h, &b, 2, 2);
        relu(&h)
    };

    let out = run();
    backward(&out, Some(Array1::ones(out.len())));

    let w_grad = w.grad().unwrap();
    let b_grad = b.grad().unwrap();

    for idx in 0..w.len() {
        let expected = numerical_grad(&w, idx, || run().data().sum());
        assert_relative_eq!(w_grad[idx], expected, epsilon = 1e-2);
    }
    for idx in 0..b.len() {
        let expected = numerical_grad(&b, idx, || run().data().sum());
        assert_relative_eq!(b_grad[idx], expected, epsilon = 1e-2);
    }
}

#[test]
fn test_gradients_accumulate_across_calls() {
    let w = Tensor::from_vec(vec![1.0, 2.0], true);
    let x = Tensor::from_vec(vec![3.0, 4.0], false);

    for _ in 0..2 {
        let y = matmul(&x, &w, 1, 2, 1);
        backward(&y, Some(Array1::ones(1)));
    }

    // d(x @ w)/dw = x, accumulated twice
    assert_eq!(w.grad().unwrap().to_vec(), vec![6.0, 8.0]);

    w.zero_grad();
    assert!(w.grad().is_none());
}

#[test]
fn test_frozen_input_gets_no_grad() {
    let x = Tensor::from_vec(vec![1.0, 2.0], false);
    let w = Tensor::from_vec(vec![1.0, 1.0], true);
    let y = matmul(&x, &w, 1, 2, 1);
    backward(&y, None);

    assert!(x.grad().is_none());
    assert!(w.grad().is_some());
}
