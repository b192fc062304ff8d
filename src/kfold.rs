//! Stratified k-fold splitting
//!
//! Produces k train/validation index splits that preserve class ratios.
//! Within each class, samples are dealt to folds in corpus order as k
//! contiguous chunks whose sizes differ by at most one, with the leading
//! folds taking the extra sample when the class count does not divide
//! evenly.

use crate::{Error, Result};

/// Train/validation index pair for one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
}

/// Stratified k-fold splitter.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    /// Create a splitter. Errors if fewer than 2 splits are requested.
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(Error::ConfigError(format!(
                "k-fold requires at least 2 splits, got {n_splits}"
            )));
        }
        Ok(Self { n_splits })
    }

    /// Number of folds produced.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split sample indices by label.
    ///
    /// Errors if any class has fewer samples than there are folds, since
    /// some validation fold would then miss that class entirely.
    pub fn split(&self, labels: &[u8]) -> Result<Vec<FoldSplit>> {
        if labels.is_empty() {
            return Err(Error::ConfigError(
                "cannot split an empty label set".to_string(),
            ));
        }

        // Indices per class, in corpus order
        let mut classes: Vec<u8> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut per_class: Vec<(u8, Vec<usize>)> = classes
            .iter()
            .map(|&c| (c, Vec::new()))
            .collect();
        for (idx, &label) in labels.iter().enumerate() {
            let slot = per_class
                .iter_mut()
                .find(|(c, _)| *c == label)
                .map(|(_, v)| v)
                .unwrap_or_else(|| unreachable!("class list built from labels"));
            slot.push(idx);
        }

        for (class, indices) in &per_class {
            if indices.len() < self.n_splits {
                return Err(Error::ConfigError(format!(
                    "class {class} has {} samples, fewer than n_splits={}",
                    indices.len(),
                    self.n_splits
                )));
            }
        }

        // Validation membership per fold: contiguous per-class chunks
        let mut valid_sets: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for (_, indices) in &per_class {
            let base = indices.len() / self.n_splits;
            let extra = indices.len() % self.n_splits;
            let mut cursor = 0;
            for (fold, valid) in valid_sets.iter_mut().enumerate() {
                let size = base + usize::from(fold < extra);
                valid.extend_from_slice(&indices[cursor..cursor + size]);
                cursor += size;
            }
        }

        let splits = valid_sets
            .into_iter()
            .map(|mut valid| {
                valid.sort_unstable();
                let train = (0..labels.len())
                    .filter(|i| valid.binary_search(i).is_err())
                    .collect();
                FoldSplit { train, valid }
            })
            .collect();

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_single_split() {
        assert!(StratifiedKFold::new(1).is_err());
        assert!(StratifiedKFold::new(0).is_err());
    }

    #[test]
    fn test_rejects_class_smaller_than_k() {
        let skf = StratifiedKFold::new(3).unwrap();
        // Only two samples of class 1
        let labels = vec![0, 0, 0, 0, 1, 1];
        assert!(skf.split(&labels).is_err());
    }

    #[test]
    fn test_balanced_two_class_split() {
        let skf = StratifiedKFold::new(2).unwrap();
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let splits = skf.split(&labels).unwrap();
        assert_eq!(splits.len(), 2);

        for split in &splits {
            assert_eq!(split.valid.len(), 4);
            assert_eq!(split.train.len(), 4);
            // Each side keeps the 50/50 class ratio
            let valid_ones = split.valid.iter().filter(|&&i| labels[i] == 1).count();
            assert_eq!(valid_ones, 2);
        }
    }

    #[test]
    fn test_leading_folds_take_remainder() {
        let skf = StratifiedKFold::new(3).unwrap();
        // 7 samples of class 0: fold sizes 3, 2, 2
        let labels = vec![0; 7];
        let splits = skf.split(&labels).unwrap();
        assert_eq!(splits[0].valid, vec![0, 1, 2]);
        assert_eq!(splits[1].valid, vec![3, 4]);
        assert_eq!(splits[2].valid, vec![5, 6]);
    }

    proptest! {
        #[test]
        fn prop_folds_partition_all_indices(
            n_fake in 5usize..40,
            n_satire in 5usize..40,
            seed in 0u64..1000,
        ) {
            let mut labels: Vec<u8> =
                std::iter::repeat(1).take(n_fake)
                    .chain(std::iter::repeat(0).take(n_satire))
                    .collect();
            crate::corpus::shuffle(&mut labels, seed);

            let skf = StratifiedKFold::new(5).unwrap();
            let splits = skf.split(&labels).unwrap();
            prop_assert_eq!(splits.len(), 5);

            // Every index lands in exactly one validation fold
            let mut seen = vec![0usize; labels.len()];
            for split in &splits {
                for &i in &split.valid {
                    seen[i] += 1;
                }
                // train and valid are disjoint and cover everything
                prop_assert_eq!(split.train.len() + split.valid.len(), labels.len());
                for &i in &split.train {
                    prop_assert!(split.valid.binary_search(&i).is_err());
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
        }

        #[test]
        fn prop_fold_class_counts_differ_by_at_most_one(
            n_fake in 5usize..60,
            n_satire in 5usize..60,
        ) {
            let labels: Vec<u8> =
                std::iter::repeat(1).take(n_fake)
                    .chain(std::iter::repeat(0).take(n_satire))
                    .collect();
            let skf = StratifiedKFold::new(5).unwrap();
            let splits = skf.split(&labels).unwrap();

            for class in [0u8, 1u8] {
                let counts: Vec<usize> = splits
                    .iter()
                    .map(|s| s.valid.iter().filter(|&&i| labels[i] == class).count())
                    .collect();
                let min = counts.iter().min().unwrap();
                let max = counts.iter().max().unwrap();
                prop_assert!(max - min <= 1);
            }
        }
    }
}
