//! Confusion matrix for multi-class classification

use std::fmt;

/// Confusion matrix over a fixed set of classes.
///
/// Element [i][j] counts samples with true label i predicted as j. The class
/// count is fixed up front so a validation fold that happens to miss a class
/// still produces a matrix of the configured size.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    /// matrix[true_label][predicted_label] = count
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Create an empty confusion matrix with the given number of classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            matrix: vec![vec![0; n_classes]; n_classes],
            n_classes,
        }
    }

    /// Build from predictions and ground truth. Labels outside
    /// `0..n_classes` are ignored.
    #[must_use]
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Self {
        assert_eq!(
            y_pred.len(),
            y_true.len(),
            "Predictions and targets must have same length"
        );

        let mut cm = Self::new(n_classes);
        for (&pred, &true_label) in y_pred.iter().zip(y_true.iter()) {
            if pred < n_classes && true_label < n_classes {
                cm.matrix[true_label][pred] += 1;
            }
        }
        cm
    }

    /// Number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Count at [true_label][predicted_label].
    #[must_use]
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.matrix[true_label][predicted_label]
    }

    /// True positives for a class.
    #[must_use]
    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// False positives for a class (predicted as class but wasn't).
    #[must_use]
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// False negatives for a class (was class but predicted differently).
    #[must_use]
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&j| j != class)
            .map(|j| self.matrix[class][j])
            .sum()
    }

    /// True negatives for a class.
    #[must_use]
    pub fn true_negatives(&self, class: usize) -> usize {
        self.total()
            - self.true_positives(class)
            - self.false_positives(class)
            - self.false_negatives(class)
    }

    /// Support (total true instances) for a class.
    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Overall accuracy.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;

        write!(f, "      ")?;
        for j in 0..self.n_classes {
            write!(f, "Pred {j} ")?;
        }
        writeln!(f)?;

        for i in 0..self.n_classes {
            write!(f, "True {i}")?;
            for j in 0..self.n_classes {
                write!(f, "{:>6} ", self.matrix[i][j])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_accuracy() {
        let y_true = vec![0, 0, 1, 1, 1, 0];
        let y_pred = vec![0, 1, 1, 1, 0, 0];
        let cm = ConfusionMatrix::from_predictions(&y_pred, &y_true, 2);

        assert_eq!(cm.get(0, 0), 2);
        assert_eq!(cm.get(0, 1), 1);
        assert_eq!(cm.get(1, 0), 1);
        assert_eq!(cm.get(1, 1), 2);
        assert_eq!(cm.total(), 6);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_class_count_with_missing_class() {
        // Validation fold where class 1 never appears
        let y_true = vec![0, 0, 0];
        let y_pred = vec![0, 0, 0];
        let cm = ConfusionMatrix::from_predictions(&y_pred, &y_true, 2);

        assert_eq!(cm.n_classes(), 2);
        assert_eq!(cm.support(0), 3);
        assert_eq!(cm.support(1), 0);
        assert!((cm.accuracy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tp_fp_fn_per_class() {
        let y_true = vec![0, 1, 1, 0];
        let y_pred = vec![1, 1, 0, 0];
        let cm = ConfusionMatrix::from_predictions(&y_pred, &y_true, 2);

        assert_eq!(cm.true_positives(1), 1);
        assert_eq!(cm.false_positives(1), 1);
        assert_eq!(cm.false_negatives(1), 1);
        assert_eq!(cm.true_negatives(1), 1);
    }

    #[test]
    fn test_empty_matrix_accuracy_zero() {
        let cm = ConfusionMatrix::new(2);
        assert_eq!(cm.accuracy(), 0.0);
    }
}
