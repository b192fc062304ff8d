//! AdamW optimizer (Adam with decoupled weight decay)

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// AdamW optimizer
///
/// Weight decay is applied directly to the parameters rather than folded
/// into the gradient:
///
/// θ_t = (1 - lr * λ) * θ_{t-1} - lr_t * m_t / (√v_t + ε)
pub struct AdamW {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>,
    v: Vec<Option<Array1<f32>>>,
}

impl AdamW {
    /// Create a new AdamW optimizer
    #[must_use]
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Create AdamW with standard betas and epsilon.
    #[must_use]
    pub fn with_decay(lr: f32, weight_decay: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, weight_decay)
    }

    /// Optimizer step counter.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Weight decay hyperparameter.
    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }
}

impl Optimizer for AdamW {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        // Bias correction factors
        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                // m_t = β1 * m_{t-1} + (1 - β1) * g
                let m_t = if let Some(m) = &self.m[i] {
                    m * self.beta1 + &grad * (1.0 - self.beta1)
                } else {
                    &grad * (1.0 - self.beta1)
                };

                // v_t = β2 * v_{t-1} + (1 - β2) * g²
                let grad_sq = &grad * &grad;
                let v_t = if let Some(v) = &self.v[i] {
                    v * self.beta2 + &grad_sq * (1.0 - self.beta2)
                } else {
                    &grad_sq * (1.0 - self.beta2)
                };

                let adaptive_update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
                let weight_decay_factor = 1.0 - self.lr * self.weight_decay;

                let new_data = param.data().to_owned() * weight_decay_factor - &adaptive_update;
                *param.data_mut() = new_data;

                self.m[i] = Some(m_t);
                self.v[i] = Some(v_t);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_adamw_quadratic_convergence() {
        // f(x) = x², gradient 2x
        let mut param = Tensor::from_vec(vec![5.0, -3.0, 2.0], true);
        let mut optimizer = AdamW::with_decay(0.1, 0.01);

        for _ in 0..100 {
            let grad = param.data().mapv(|x| 2.0 * x);
            param.set_grad(grad);
            optimizer.step_refs(&mut [&mut param]);
        }

        for &val in param.data().iter() {
            assert!(val.abs() < 0.5, "Value {val} did not converge");
        }
    }

    #[test]
    fn test_adamw_weight_decay_alone() {
        // Zero gradient: only decoupled weight decay moves the parameter
        let mut param = Tensor::from_vec(vec![1.0], true);
        let mut optimizer = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.1);

        param.set_grad(ndarray::arr1(&[0.0]));
        optimizer.step_refs(&mut [&mut param]);

        // θ_t = (1 - 0.1 * 0.1) * 1.0 = 0.99
        assert_abs_diff_eq!(param.data()[0], 0.99, epsilon = 1e-6);
    }

    #[test]
    fn test_no_grad_leaves_param_unchanged() {
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut optimizer = AdamW::with_decay(0.1, 0.01);

        optimizer.step_refs(&mut [&mut param]);
        assert_eq!(param.data().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_first_step_size_near_lr() {
        // Bias correction makes the first step approximately lr-sized
        let mut param = Tensor::from_vec(vec![0.0], true);
        let mut optimizer = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.0);

        param.set_grad(ndarray::arr1(&[1.0]));
        optimizer.step_refs(&mut [&mut param]);
        assert!(param.data()[0].abs() > 0.05);
    }

    #[test]
    fn test_moments_track_multiple_params() {
        let mut w = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut b = Tensor::from_vec(vec![3.0], true);
        let mut optimizer = AdamW::with_decay(0.1, 0.0);

        w.set_grad(ndarray::arr1(&[0.1, 0.2]));
        b.set_grad(ndarray::arr1(&[0.3]));
        optimizer.step_refs(&mut [&mut w, &mut b]);

        assert!(w.data()[0] < 1.0);
        assert!(b.data()[0] < 3.0);
        assert_eq!(optimizer.step_count(), 1);
    }

    #[test]
    fn test_lr_getter_setter() {
        let mut optimizer = AdamW::with_decay(0.1, 0.01);
        assert_abs_diff_eq!(optimizer.lr(), 0.1, epsilon = 1e-6);
        optimizer.set_lr(0.01);
        assert_abs_diff_eq!(optimizer.lr(), 0.01, epsilon = 1e-6);
    }
}
