//! Layer normalization.

/// LayerNorm with learned scale and shift.
#[derive(Debug, Clone)]
pub struct LayerNorm {
    pub gamma: Vec<f32>,
    pub beta: Vec<f32>,
    eps: f32,
}

impl LayerNorm {
    /// Identity-initialized LayerNorm.
    #[must_use]
    pub fn new(hidden_size: usize, eps: f32) -> Self {
        Self {
            gamma: vec![1.0; hidden_size],
            beta: vec![0.0; hidden_size],
            eps,
        }
    }

    /// Create from pretrained buffers.
    #[must_use]
    pub fn from_parts(gamma: Vec<f32>, beta: Vec<f32>, eps: f32) -> Self {
        debug_assert_eq!(gamma.len(), beta.len());
        Self { gamma, beta, eps }
    }

    /// Normalize each row of a flattened (rows, hidden_size) input.
    ///
    /// LN(x) = (x - mean) / sqrt(var + eps) * gamma + beta, with mean and
    /// variance taken per row.
    #[must_use]
    pub fn forward_batched(&self, x: &[f32], rows: usize, hidden_size: usize) -> Vec<f32> {
        debug_assert_eq!(x.len(), rows * hidden_size);
        let mut out = vec![0.0; x.len()];

        for r in 0..rows {
            let row = &x[r * hidden_size..(r + 1) * hidden_size];
            let mean: f32 = row.iter().sum::<f32>() / hidden_size as f32;
            let var: f32 =
                row.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / hidden_size as f32;
            let inv_std = 1.0 / (var + self.eps).sqrt();

            for (i, &v) in row.iter().enumerate() {
                out[r * hidden_size + i] = (v - mean) * inv_std * self.gamma[i] + self.beta[i];
            }
        }

        out
    }
}
