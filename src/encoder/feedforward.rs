//! Position-wise feed-forward network.

use super::config::EncoderConfig;
use super::linear::Linear;

/// GELU, tanh approximation.
///
/// gelu(x) ≈ 0.5 * x * (1 + tanh(sqrt(2/pi) * (x + 0.044715 * x^3)))
#[inline]
#[must_use]
pub fn gelu(x: f32) -> f32 {
    const SQRT_2_OVER_PI: f32 = 0.797_884_6;
    const COEFF: f32 = 0.044_715;
    0.5 * x * (1.0 + (SQRT_2_OVER_PI * (x + COEFF * x * x * x)).tanh())
}

/// Two-layer feed-forward with GELU between.
#[derive(Debug, Clone)]
pub struct FeedForward {
    pub lin1: Linear,
    pub lin2: Linear,
}

impl FeedForward {
    /// Create with deterministic initialization.
    #[must_use]
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            lin1: Linear::new(config.hidden_size, config.ffn_size, 0.567),
            lin2: Linear::new(config.ffn_size, config.hidden_size, 0.678),
        }
    }

    /// Create from pretrained layers.
    #[must_use]
    pub fn from_parts(lin1: Linear, lin2: Linear) -> Self {
        Self { lin1, lin2 }
    }

    /// Forward over a flattened (rows, hidden_size) input.
    #[must_use]
    pub fn forward(&self, x: &[f32], rows: usize) -> Vec<f32> {
        let mut inner = self.lin1.forward(x, rows);
        for v in &mut inner {
            *v = gelu(*v);
        }
        self.lin2.forward(&inner, rows)
    }
}
