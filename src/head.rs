//! Trainable classification head
//!
//! Two dense layers with ReLU and dropout between, applied to the pooled
//! encoder output. This is the only part of the model with gradients; its
//! forward pass runs on the autograd tape.

use crate::autograd::{add_bias, dropout, matmul, relu, Tensor};
use rand::rngs::StdRng;

/// Classification head: linear -> ReLU -> dropout -> linear.
pub struct SeqClassifier {
    /// (rep_dim, rep_dim) flattened
    pub pre_classifier_w: Tensor,
    pub pre_classifier_b: Tensor,
    /// (rep_dim, num_labels) flattened
    pub classifier_w: Tensor,
    pub classifier_b: Tensor,
    rep_dim: usize,
    num_labels: usize,
    dropout_rate: f32,
}

impl SeqClassifier {
    /// Create with seeded Xavier-uniform initialization.
    #[must_use]
    pub fn new(rep_dim: usize, num_labels: usize, dropout_rate: f32, seed: u64) -> Self {
        let mut state = seed;
        let mut uniform = move || {
            // 64-bit LCG, mapped to [-1, 1)
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
        };

        let xavier = |fan_in: usize, fan_out: usize, uniform: &mut dyn FnMut() -> f32| {
            let bound = (6.0 / (fan_in + fan_out) as f32).sqrt();
            (0..fan_in * fan_out).map(|_| uniform() * bound).collect()
        };

        Self {
            pre_classifier_w: Tensor::from_vec(xavier(rep_dim, rep_dim, &mut uniform), true),
            pre_classifier_b: Tensor::zeros(rep_dim, true),
            classifier_w: Tensor::from_vec(xavier(rep_dim, num_labels, &mut uniform), true),
            classifier_b: Tensor::zeros(num_labels, true),
            rep_dim,
            num_labels,
            dropout_rate,
        }
    }

    /// Number of output classes.
    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Forward over a flattened (batch, rep_dim) pooled input.
    ///
    /// Returns (batch, num_labels) logits on the tape. Dropout only fires
    /// when `training` is set.
    pub fn forward(
        &self,
        pooled: &[f32],
        batch: usize,
        training: bool,
        rng: &mut StdRng,
    ) -> Tensor {
        debug_assert_eq!(pooled.len(), batch * self.rep_dim);
        let input = Tensor::from_vec(pooled.to_vec(), false);

        let hidden = matmul(&input, &self.pre_classifier_w, batch, self.rep_dim, self.rep_dim);
        let hidden = add_bias(&hidden, &self.pre_classifier_b, batch, self.rep_dim);
        let hidden = relu(&hidden);
        let hidden = dropout(&hidden, self.dropout_rate, training, rng);

        let logits = matmul(&hidden, &self.classifier_w, batch, self.rep_dim, self.num_labels);
        add_bias(&logits, &self.classifier_b, batch, self.num_labels)
    }

    /// Trainable parameters for the optimizer.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![
            &mut self.pre_classifier_w,
            &mut self.pre_classifier_b,
            &mut self.classifier_w,
            &mut self.classifier_b,
        ]
    }

    /// Clear accumulated gradients on all parameters.
    pub fn zero_grad(&self) {
        self.pre_classifier_w.zero_grad();
        self.pre_classifier_b.zero_grad();
        self.classifier_w.zero_grad();
        self.classifier_b.zero_grad();
    }
}
