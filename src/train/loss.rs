//! Negative log-likelihood over log-softmax outputs.

use ndarray::Array1;

/// Loss value reported when the computed loss is not finite.
const LOSS_CLAMP: f32 = 100.0;

/// Row-wise log-softmax over flattened (batch, n_classes) logits.
#[must_use]
pub fn log_softmax(logits: &[f32], batch: usize, n_classes: usize) -> Vec<f32> {
    debug_assert_eq!(logits.len(), batch * n_classes);
    let mut out = vec![0.0f32; logits.len()];

    for b in 0..batch {
        let row = &logits[b * n_classes..(b + 1) * n_classes];
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let log_sum: f32 = row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln();
        for (c, &v) in row.iter().enumerate() {
            out[b * n_classes + c] = v - max - log_sum;
        }
    }
    out
}

/// Mean negative log-likelihood of the true classes.
///
/// A non-finite result is clamped so one degenerate batch cannot poison
/// the epoch average.
#[must_use]
pub fn nll_loss(log_probs: &[f32], labels: &[u8], n_classes: usize) -> f32 {
    let batch = labels.len();
    debug_assert_eq!(log_probs.len(), batch * n_classes);

    let sum: f32 = labels
        .iter()
        .enumerate()
        .map(|(b, &label)| -log_probs[b * n_classes + label as usize])
        .sum();
    let loss = sum / batch as f32;
    if loss.is_finite() {
        loss
    } else {
        LOSS_CLAMP
    }
}

/// Gradient of the mean NLL with respect to the raw logits.
///
/// For log-softmax + NLL this collapses to (softmax - one_hot) / batch.
#[must_use]
pub fn logit_grad(log_probs: &[f32], labels: &[u8], n_classes: usize) -> Array1<f32> {
    let batch = labels.len();
    let mut grad = vec![0.0f32; batch * n_classes];

    for (b, &label) in labels.iter().enumerate() {
        for c in 0..n_classes {
            let p = log_probs[b * n_classes + c].exp();
            let target = if c == label as usize { 1.0 } else { 0.0 };
            grad[b * n_classes + c] = (p - target) / batch as f32;
        }
    }
    Array1::from(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_softmax_rows_sum_to_one() {
        let logits = vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0];
        let lp = log_softmax(&logits, 2, 3);
        for row in lp.chunks(3) {
            let sum: f32 = row.iter().map(|v| v.exp()).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_log_softmax_stable_for_large_logits() {
        let lp = log_softmax(&[1000.0, 999.0], 1, 2);
        assert!(lp.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_nll_matches_hand_computation() {
        // Uniform over 2 classes: -ln(0.5)
        let lp = log_softmax(&[0.0, 0.0], 1, 2);
        let loss = nll_loss(&lp, &[1], 2);
        assert_relative_eq!(loss, std::f32::consts::LN_2, epsilon = 1e-5);
    }

    #[test]
    fn test_non_finite_loss_is_clamped() {
        // Zero probability at the true label gives -ln(0) = inf
        let lp = vec![f32::NEG_INFINITY, 0.0];
        assert_eq!(nll_loss(&lp, &[0], 2), LOSS_CLAMP);

        let lp = vec![f32::NAN, 0.0];
        assert_eq!(nll_loss(&lp, &[0], 2), LOSS_CLAMP);
    }

    #[test]
    fn test_logit_grad_is_softmax_minus_onehot() {
        let logits = vec![0.0, 0.0];
        let lp = log_softmax(&logits, 1, 2);
        let grad = logit_grad(&lp, &[0], 2);
        // softmax = [0.5, 0.5], one_hot = [1, 0], batch 1
        assert_relative_eq!(grad[0], -0.5, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_logit_grad_rows_sum_to_zero() {
        let logits = vec![1.0, -2.0, 0.5, 3.0, 0.0, -1.0];
        let lp = log_softmax(&logits, 2, 3);
        let grad = logit_grad(&lp, &[2, 0], 3);
        for b in 0..2 {
            let row_sum: f32 = (0..3).map(|c| grad[b * 3 + c]).sum();
            assert_relative_eq!(row_sum, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_grad_descends_loss() {
        // One gradient step on raw logits should reduce the NLL
        let mut logits = vec![0.3, -0.2];
        let labels = [1u8];
        let before = nll_loss(&log_softmax(&logits, 1, 2), &labels, 2);

        let grad = logit_grad(&log_softmax(&logits, 1, 2), &labels, 2);
        for (l, g) in logits.iter_mut().zip(grad.iter()) {
            *l -= 0.5 * g;
        }
        let after = nll_loss(&log_softmax(&logits, 1, 2), &labels, 2);
        assert!(after < before);
    }
}
