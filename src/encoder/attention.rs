//! Multi-head self-attention with padding mask.

use super::config::EncoderConfig;
use super::linear::Linear;
use crate::autograd::matmul_compute;

/// Additive score for masked (padding) positions.
const MASK_SCORE: f32 = -1e9;

/// Multi-head self-attention layer.
#[derive(Debug, Clone)]
pub struct MultiHeadAttention {
    pub q_lin: Linear,
    pub k_lin: Linear,
    pub v_lin: Linear,
    pub out_lin: Linear,
    num_heads: usize,
    head_dim: usize,
    hidden_size: usize,
}

impl MultiHeadAttention {
    /// Create with deterministic initialization.
    #[must_use]
    pub fn new(config: &EncoderConfig) -> Self {
        let h = config.hidden_size;
        Self {
            q_lin: Linear::new(h, h, 0.123),
            k_lin: Linear::new(h, h, 0.234),
            v_lin: Linear::new(h, h, 0.345),
            out_lin: Linear::new(h, h, 0.456),
            num_heads: config.num_attention_heads,
            head_dim: config.head_dim(),
            hidden_size: h,
        }
    }

    /// Create from pretrained projections.
    #[must_use]
    pub fn from_parts(
        q_lin: Linear,
        k_lin: Linear,
        v_lin: Linear,
        out_lin: Linear,
        config: &EncoderConfig,
    ) -> Self {
        Self {
            q_lin,
            k_lin,
            v_lin,
            out_lin,
            num_heads: config.num_attention_heads,
            head_dim: config.head_dim(),
            hidden_size: config.hidden_size,
        }
    }

    /// Forward over a flattened (seq_len, hidden_size) input.
    ///
    /// `attention_mask` marks real tokens with 1; key positions with mask 0
    /// receive an additive -1e9 score so softmax drives them to zero.
    #[must_use]
    pub fn forward(&self, x: &[f32], seq_len: usize, attention_mask: &[u8]) -> Vec<f32> {
        let h = self.hidden_size;
        let d = self.head_dim;
        let scale = 1.0 / (d as f32).sqrt();

        let q = self.q_lin.forward(x, seq_len);
        let k = self.k_lin.forward(x, seq_len);
        let v = self.v_lin.forward(x, seq_len);

        let mut concat = vec![0.0f32; seq_len * h];

        for head in 0..self.num_heads {
            let offset = head * d;

            // Slice this head's columns: (seq_len, head_dim)
            let slice_head = |m: &[f32]| -> Vec<f32> {
                let mut out = Vec::with_capacity(seq_len * d);
                for s in 0..seq_len {
                    out.extend_from_slice(&m[s * h + offset..s * h + offset + d]);
                }
                out
            };
            let q_head = slice_head(&q);
            let k_head = slice_head(&k);
            let v_head = slice_head(&v);

            // scores = Q K^T / sqrt(d): (seq_len, seq_len)
            let k_t = crate::autograd::transpose(&k_head, seq_len, d);
            let mut scores = matmul_compute(&q_head, &k_t, seq_len, d, seq_len);
            for row in 0..seq_len {
                for col in 0..seq_len {
                    let idx = row * seq_len + col;
                    scores[idx] *= scale;
                    if attention_mask[col] == 0 {
                        scores[idx] += MASK_SCORE;
                    }
                }
            }

            // Row-wise softmax
            for row in scores.chunks_mut(seq_len) {
                let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut sum = 0.0;
                for s in row.iter_mut() {
                    *s = (*s - max).exp();
                    sum += *s;
                }
                for s in row.iter_mut() {
                    *s /= sum;
                }
            }

            // Weighted value sum: (seq_len, head_dim)
            let head_out = matmul_compute(&scores, &v_head, seq_len, seq_len, d);

            for s in 0..seq_len {
                concat[s * h + offset..s * h + offset + d]
                    .copy_from_slice(&head_out[s * d..(s + 1) * d]);
            }
        }

        self.out_lin.forward(&concat, seq_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attention_output_shape() {
        let config = EncoderConfig::tiny();
        let attn = MultiHeadAttention::new(&config);
        let x = vec![0.1; 4 * config.hidden_size];
        let out = attn.forward(&x, 4, &[1, 1, 1, 1]);
        assert_eq!(out.len(), 4 * config.hidden_size);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_padding_does_not_influence_real_tokens() {
        let config = EncoderConfig::tiny();
        let attn = MultiHeadAttention::new(&config);
        let h = config.hidden_size;

        // Same two real tokens, different padding contents
        let real: Vec<f32> = (0..2 * h).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut a = real.clone();
        a.extend(vec![0.7; h]);
        let mut b = real.clone();
        b.extend(vec![-0.3; h]);

        let out_a = attn.forward(&a, 3, &[1, 1, 0]);
        let out_b = attn.forward(&b, 3, &[1, 1, 0]);

        for i in 0..2 * h {
            assert!((out_a[i] - out_b[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_softmax_rows_are_finite_when_fully_masked_row_is_query() {
        // A padding query still produces finite output (it attends to real keys)
        let config = EncoderConfig::tiny();
        let attn = MultiHeadAttention::new(&config);
        let x = vec![0.2; 2 * config.hidden_size];
        let out = attn.forward(&x, 2, &[1, 0]);
        assert!(out.iter().all(|v| v.is_finite()));
    }
}
