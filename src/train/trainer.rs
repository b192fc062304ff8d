//! Per-fold training loop.

use super::loss::{log_softmax, logit_grad, nll_loss};
use crate::autograd::backward;
use crate::corpus::shuffle;
use crate::eval::{Average, MultiClassMetrics};
use crate::head::SeqClassifier;
use crate::optim::{AdamW, Optimizer};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Hyperparameters for one fold of head training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub n_epochs: usize,
    pub n_classes: usize,
    pub batch_size: usize,
    pub learn_rate: f32,
    pub weight_decay: f32,
    pub checkpoints_per_epoch: usize,
    pub dropout: f32,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_epochs: 10,
            n_classes: 2,
            batch_size: 8,
            learn_rate: 1e-5,
            weight_decay: 1e-3,
            checkpoints_per_epoch: 1,
            dropout: 0.1,
            seed: 42,
        }
    }
}

/// A sample reduced to its frozen pooled representation.
#[derive(Debug, Clone)]
pub struct PooledExample {
    pub features: Vec<f32>,
    pub label: u8,
}

/// Validation metrics for one fold.
#[derive(Debug, Clone, Copy)]
pub struct FoldResult {
    /// Weighted F1 of the last validation pass
    pub f1: f64,
    /// Accuracy of the last validation pass
    pub accuracy: f64,
    /// Mean validation loss of the last validation pass
    pub loss: f64,
    /// Best weighted F1 seen at any checkpoint
    pub best_f1: f64,
}

/// Trains a fresh classification head on one fold.
pub struct FoldTrainer {
    config: TrainingConfig,
    head: SeqClassifier,
    optimizer: AdamW,
    rng: StdRng,
}

impl FoldTrainer {
    /// Create a trainer with a freshly initialized head.
    #[must_use]
    pub fn new(config: TrainingConfig, rep_dim: usize) -> Self {
        let head = SeqClassifier::new(rep_dim, config.n_classes, config.dropout, config.seed);
        let optimizer = AdamW::with_decay(config.learn_rate, config.weight_decay);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            head,
            optimizer,
            rng,
        }
    }

    /// Run the epoch loop and return the final validation metrics.
    pub fn run(&mut self, train_set: &[PooledExample], valid_set: &[PooledExample]) -> FoldResult {
        let n_batches = train_set.len().div_ceil(self.config.batch_size);
        let eval_every = (n_batches / self.config.checkpoints_per_epoch).max(1);

        let mut best_f1 = 0.0f64;
        let mut last = FoldResult {
            f1: 0.0,
            accuracy: 0.0,
            loss: 0.0,
            best_f1: 0.0,
        };

        for epoch in 0..self.config.n_epochs {
            println!("Epoch {}", epoch + 1);

            let mut order: Vec<usize> = (0..train_set.len()).collect();
            shuffle(&mut order, self.config.seed + epoch as u64);

            let mut epoch_loss = 0.0f64;
            let mut train_preds: Vec<usize> = Vec::with_capacity(train_set.len());
            let mut train_tgts: Vec<usize> = Vec::with_capacity(train_set.len());

            for (step, batch_ixs) in order.chunks(self.config.batch_size).enumerate() {
                let (loss, preds) = self.train_batch(train_set, batch_ixs);
                epoch_loss += f64::from(loss);
                train_preds.extend(preds);
                train_tgts.extend(batch_ixs.iter().map(|&ix| train_set[ix].label as usize));

                if (step + 1) % eval_every == 0 || step + 1 == n_batches {
                    let train_metrics = MultiClassMetrics::from_predictions(
                        &train_preds,
                        &train_tgts,
                        self.config.n_classes,
                    );
                    println!(
                        "Training F1: {}, epoch loss: {}",
                        round4(train_metrics.f1_avg(Average::Weighted)),
                        round4(epoch_loss / (step + 1) as f64),
                    );

                    last = self.validate(valid_set);
                    println!(
                        "Validation F1: {}, Acc: {}, epoch loss: {}",
                        round4(last.f1),
                        round4(last.accuracy),
                        round4(last.loss),
                    );
                    if last.f1 > best_f1 {
                        best_f1 = last.f1;
                    }
                }
            }
        }

        last.best_f1 = best_f1;
        last
    }

    /// One optimizer step over a batch. Returns the batch loss and the
    /// predicted classes.
    fn train_batch(&mut self, train_set: &[PooledExample], batch_ixs: &[usize]) -> (f32, Vec<usize>) {
        let n_classes = self.config.n_classes;
        let batch = batch_ixs.len();

        let mut pooled = Vec::with_capacity(batch * train_set[batch_ixs[0]].features.len());
        let mut labels = Vec::with_capacity(batch);
        for &ix in batch_ixs {
            pooled.extend_from_slice(&train_set[ix].features);
            labels.push(train_set[ix].label);
        }

        self.head.zero_grad();
        let logits = self.head.forward(&pooled, batch, true, &mut self.rng);
        let log_probs = log_softmax(&logits.data().to_vec(), batch, n_classes);
        let loss = nll_loss(&log_probs, &labels, n_classes);

        let grad = logit_grad(&log_probs, &labels, n_classes);
        backward(&logits, Some(grad));
        self.optimizer.step_refs(&mut self.head.parameters_mut());

        let preds = argmax_rows(&log_probs, n_classes);
        (loss, preds)
    }

    /// Full pass over the validation set without dropout or updates.
    fn validate(&mut self, valid_set: &[PooledExample]) -> FoldResult {
        let n_classes = self.config.n_classes;
        let mut preds = Vec::with_capacity(valid_set.len());
        let mut tgts = Vec::with_capacity(valid_set.len());
        let mut loss_sum = 0.0f64;
        let mut n_batches = 0usize;

        for chunk in valid_set.chunks(self.config.batch_size) {
            let batch = chunk.len();
            let mut pooled = Vec::with_capacity(batch * chunk[0].features.len());
            let mut labels = Vec::with_capacity(batch);
            for ex in chunk {
                pooled.extend_from_slice(&ex.features);
                labels.push(ex.label);
            }

            let logits = self.head.forward(&pooled, batch, false, &mut self.rng);
            let log_probs = log_softmax(&logits.data().to_vec(), batch, n_classes);
            loss_sum += f64::from(nll_loss(&log_probs, &labels, n_classes));
            n_batches += 1;

            preds.extend(argmax_rows(&log_probs, n_classes));
            tgts.extend(labels.iter().map(|&l| l as usize));
        }

        let metrics = MultiClassMetrics::from_predictions(&preds, &tgts, n_classes);
        FoldResult {
            f1: metrics.f1_avg(Average::Weighted),
            accuracy: accuracy(&preds, &tgts),
            loss: loss_sum / n_batches.max(1) as f64,
            best_f1: 0.0,
        }
    }
}

fn accuracy(preds: &[usize], tgts: &[usize]) -> f64 {
    if preds.is_empty() {
        return 0.0;
    }
    let correct = preds.iter().zip(tgts.iter()).filter(|(p, t)| p == t).count();
    correct as f64 / preds.len() as f64
}

fn argmax_rows(log_probs: &[f32], n_classes: usize) -> Vec<usize> {
    log_probs
        .chunks(n_classes)
        .map(|row| {
            row.iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map_or(0, |(i, _)| i)
        })
        .collect()
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters in feature space.
    fn toy_sets(dim: usize) -> (Vec<PooledExample>, Vec<PooledExample>) {
        let make = |n: usize, offset: f32, label: u8| -> Vec<PooledExample> {
            (0..n)
                .map(|i| PooledExample {
                    features: (0..dim)
                        .map(|d| offset + ((i * dim + d) as f32 * 0.13).sin() * 0.1)
                        .collect(),
                    label,
                })
                .collect()
        };

        let mut train = make(12, 1.0, 1);
        train.extend(make(12, -1.0, 0));
        let mut valid = make(4, 1.0, 1);
        valid.extend(make(4, -1.0, 0));
        (train, valid)
    }

    #[test]
    fn test_separable_data_trains_to_high_f1() {
        let (train, valid) = toy_sets(8);
        let config = TrainingConfig {
            n_epochs: 40,
            learn_rate: 1e-2,
            dropout: 0.0,
            ..TrainingConfig::default()
        };
        let mut trainer = FoldTrainer::new(config, 8);
        let result = trainer.run(&train, &valid);

        assert!(result.f1 > 0.9, "F1 {} too low", result.f1);
        assert!(result.accuracy > 0.9);
        assert!(result.best_f1 >= result.f1);
    }

    #[test]
    fn test_run_is_deterministic() {
        let (train, valid) = toy_sets(4);
        let config = TrainingConfig {
            n_epochs: 3,
            ..TrainingConfig::default()
        };

        let mut a = FoldTrainer::new(config.clone(), 4);
        let mut b = FoldTrainer::new(config, 4);
        let ra = a.run(&train, &valid);
        let rb = b.run(&train, &valid);

        assert_eq!(ra.f1, rb.f1);
        assert_eq!(ra.loss, rb.loss);
    }

    #[test]
    fn test_argmax_rows() {
        let lp = vec![-0.1, -2.0, -3.0, -0.5];
        assert_eq!(argmax_rows(&lp, 2), vec![0, 1]);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }
}
