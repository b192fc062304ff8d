//! Multi-class precision, recall, and F1

use super::average::Average;
use super::confusion::ConfusionMatrix;

/// Per-class classification metrics with averaging.
#[derive(Clone, Debug)]
pub struct MultiClassMetrics {
    /// Per-class precision
    pub precision: Vec<f64>,
    /// Per-class recall
    pub recall: Vec<f64>,
    /// Per-class F1 score
    pub f1: Vec<f64>,
    /// Per-class support (count)
    pub support: Vec<usize>,
    /// Number of classes
    pub n_classes: usize,
    /// Global TP/FP/FN totals, kept for micro-averaging
    micro_tp: usize,
    micro_fp: usize,
    micro_fn: usize,
}

impl MultiClassMetrics {
    /// Compute metrics from a confusion matrix.
    #[must_use]
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let n_classes = cm.n_classes();
        let mut precision = Vec::with_capacity(n_classes);
        let mut recall = Vec::with_capacity(n_classes);
        let mut f1 = Vec::with_capacity(n_classes);
        let mut support = Vec::with_capacity(n_classes);
        let (mut micro_tp, mut micro_fp, mut micro_fn) = (0, 0, 0);

        for class in 0..n_classes {
            let tp = cm.true_positives(class);
            let fp = cm.false_positives(class);
            let fn_ = cm.false_negatives(class);
            micro_tp += tp;
            micro_fp += fp;
            micro_fn += fn_;

            let (tp, fp, fn_) = (tp as f64, fp as f64, fn_ as f64);
            let p = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let r = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f = if p + r > 0.0 {
                2.0 * p * r / (p + r)
            } else {
                0.0
            };

            precision.push(p);
            recall.push(r);
            f1.push(f);
            support.push(cm.support(class));
        }

        Self {
            precision,
            recall,
            f1,
            support,
            n_classes,
            micro_tp,
            micro_fp,
            micro_fn,
        }
    }

    /// Compute from predictions and ground truth.
    #[must_use]
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Self {
        let cm = ConfusionMatrix::from_predictions(y_pred, y_true, n_classes);
        Self::from_confusion_matrix(&cm)
    }

    /// Averaged precision.
    #[must_use]
    pub fn precision_avg(&self, average: Average) -> f64 {
        match average {
            Average::Micro => micro_ratio(self.micro_tp, self.micro_fp),
            _ => self.average_metric(&self.precision, average),
        }
    }

    /// Averaged recall.
    #[must_use]
    pub fn recall_avg(&self, average: Average) -> f64 {
        match average {
            Average::Micro => micro_ratio(self.micro_tp, self.micro_fn),
            _ => self.average_metric(&self.recall, average),
        }
    }

    /// Averaged F1.
    #[must_use]
    pub fn f1_avg(&self, average: Average) -> f64 {
        match average {
            Average::Micro => {
                let p = self.precision_avg(Average::Micro);
                let r = self.recall_avg(Average::Micro);
                if p + r > 0.0 {
                    2.0 * p * r / (p + r)
                } else {
                    0.0
                }
            }
            _ => self.average_metric(&self.f1, average),
        }
    }

    fn average_metric(&self, values: &[f64], average: Average) -> f64 {
        match average {
            Average::Macro | Average::Micro => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Average::Weighted => {
                let total_support: usize = self.support.iter().sum();
                if total_support == 0 {
                    return 0.0;
                }
                values
                    .iter()
                    .zip(self.support.iter())
                    .map(|(&v, &s)| v * s as f64)
                    .sum::<f64>()
                    / total_support as f64
            }
        }
    }
}

fn micro_ratio(tp: usize, err: usize) -> f64 {
    if tp + err == 0 {
        0.0
    } else {
        tp as f64 / (tp + err) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 0, 1];
        let m = MultiClassMetrics::from_predictions(&y, &y, 2);
        assert_relative_eq!(m.f1_avg(Average::Weighted), 1.0);
        assert_relative_eq!(m.precision_avg(Average::Macro), 1.0);
        assert_relative_eq!(m.recall_avg(Average::Micro), 1.0);
    }

    #[test]
    fn test_weighted_f1_matches_hand_computation() {
        // true: 4x class0, 2x class1; pred confuses one each way
        let y_true = vec![0, 0, 0, 0, 1, 1];
        let y_pred = vec![0, 0, 0, 1, 0, 1];
        let m = MultiClassMetrics::from_predictions(&y_pred, &y_true, 2);

        // class0: p=3/4, r=3/4, f1=0.75; class1: p=1/2, r=1/2, f1=0.5
        assert_relative_eq!(m.f1[0], 0.75);
        assert_relative_eq!(m.f1[1], 0.5);
        // weighted: (0.75 * 4 + 0.5 * 2) / 6
        assert_relative_eq!(m.f1_avg(Average::Weighted), 4.0 / 6.0);
        // macro: (0.75 + 0.5) / 2
        assert_relative_eq!(m.f1_avg(Average::Macro), 0.625);
    }

    #[test]
    fn test_micro_f1_equals_accuracy_multiclass() {
        let y_true = vec![0, 1, 2, 0, 1, 2];
        let y_pred = vec![0, 2, 1, 0, 1, 2];
        let m = MultiClassMetrics::from_predictions(&y_pred, &y_true, 3);
        assert_relative_eq!(m.f1_avg(Average::Micro), 4.0 / 6.0);
    }

    #[test]
    fn test_degenerate_all_one_class() {
        let y_true = vec![1, 1, 1];
        let y_pred = vec![0, 0, 0];
        let m = MultiClassMetrics::from_predictions(&y_pred, &y_true, 2);
        assert_eq!(m.f1_avg(Average::Weighted), 0.0);
        assert_eq!(m.precision_avg(Average::Weighted), 0.0);
    }
}
