//! Inference-only dense layer.

use crate::autograd::matmul_compute;

/// A dense layer with frozen weights.
///
/// Weight layout is row-major (in_dim, out_dim) so the forward pass is a
/// plain GEMM over a flattened (rows, in_dim) input.
#[derive(Debug, Clone)]
pub struct Linear {
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
    in_dim: usize,
    out_dim: usize,
}

impl Linear {
    /// Create with deterministic Xavier-scaled initialization.
    #[must_use]
    pub fn new(in_dim: usize, out_dim: usize, phase: f32) -> Self {
        let scale = (2.0 / (in_dim + out_dim) as f32).sqrt();
        Self {
            weight: (0..in_dim * out_dim)
                .map(|i| (i as f32 * phase).sin() * scale)
                .collect(),
            bias: vec![0.0; out_dim],
            in_dim,
            out_dim,
        }
    }

    /// Create from pretrained buffers.
    #[must_use]
    pub fn from_parts(weight: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        debug_assert_eq!(weight.len(), in_dim * out_dim);
        debug_assert_eq!(bias.len(), out_dim);
        Self {
            weight,
            bias,
            in_dim,
            out_dim,
        }
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Forward over a flattened (rows, in_dim) input.
    #[must_use]
    pub fn forward(&self, x: &[f32], rows: usize) -> Vec<f32> {
        debug_assert_eq!(x.len(), rows * self.in_dim);
        let mut out = matmul_compute(x, &self.weight, rows, self.in_dim, self.out_dim);
        for r in 0..rows {
            for c in 0..self.out_dim {
                out[r * self.out_dim + c] += self.bias[c];
            }
        }
        out
    }
}
