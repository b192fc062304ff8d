//! Cross-validated fine-tuning experiment
//!
//! Drives the full pipeline: stratified fold splits, per-fold pooled
//! feature extraction through the frozen encoder, head training, and the
//! aggregated report of per-fold validation metrics.

use crate::corpus::{Article, TextField};
use crate::encoder::Encoder;
use crate::kfold::StratifiedKFold;
use crate::tokenizer::SequenceEncoder;
use crate::train::{FoldResult, FoldTrainer, PooledExample, TrainingConfig};
use crate::{Error, Result};
use serde::Deserialize;
use std::fmt::Write as _;

/// Full experiment configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub n_epochs: usize,
    pub n_classes: usize,
    pub batch_size: usize,
    pub learn_rate: f32,
    pub weight_decay: f32,
    pub n_folds: usize,
    pub checkpoints_per_epoch: usize,
    pub text_field: TextField,
    pub max_seq_len: usize,
    pub dropout: f32,
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_epochs: 10,
            n_classes: 2,
            batch_size: 8,
            learn_rate: 1e-5,
            weight_decay: 1e-3,
            n_folds: 5,
            checkpoints_per_epoch: 1,
            text_field: TextField::Body,
            max_seq_len: 512,
            dropout: 0.1,
            seed: 42,
        }
    }
}

impl ExperimentConfig {
    /// Check the knobs the training loop divides and chunks by.
    ///
    /// Fold-count constraints are checked by [`StratifiedKFold`] against the
    /// actual label distribution.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::ConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.checkpoints_per_epoch == 0 {
            return Err(Error::ConfigError(
                "checkpoints_per_epoch must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The per-fold training hyperparameters.
    #[must_use]
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            n_epochs: self.n_epochs,
            n_classes: self.n_classes,
            batch_size: self.batch_size,
            learn_rate: self.learn_rate,
            weight_decay: self.weight_decay,
            checkpoints_per_epoch: self.checkpoints_per_epoch,
            dropout: self.dropout,
            seed: self.seed,
        }
    }
}

/// Per-fold metrics plus their aggregation.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub folds: Vec<FoldResult>,
}

impl ExperimentReport {
    /// Mean of (f1, accuracy, loss) across folds.
    #[must_use]
    pub fn mean(&self) -> (f64, f64, f64) {
        let n = self.folds.len() as f64;
        let sum = self.folds.iter().fold((0.0, 0.0, 0.0), |acc, f| {
            (acc.0 + f.f1, acc.1 + f.accuracy, acc.2 + f.loss)
        });
        (sum.0 / n, sum.1 / n, sum.2 / n)
    }

    /// Population standard deviation of (f1, accuracy, loss) across folds.
    #[must_use]
    pub fn std(&self) -> (f64, f64, f64) {
        let n = self.folds.len() as f64;
        let mean = self.mean();
        let var = self.folds.iter().fold((0.0, 0.0, 0.0), |acc, f| {
            (
                acc.0 + (f.f1 - mean.0).powi(2),
                acc.1 + (f.accuracy - mean.1).powi(2),
                acc.2 + (f.loss - mean.2).powi(2),
            )
        });
        ((var.0 / n).sqrt(), (var.1 / n).sqrt(), (var.2 / n).sqrt())
    }

    /// Tab-separated summary: one row per fold, then mean, then std.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for fold in &self.folds {
            let _ = writeln!(out, "{}\t{}\t{}", fold.f1, fold.accuracy, fold.loss);
        }
        let mean = self.mean();
        let _ = writeln!(out, "{}\t{}\t{}", mean.0, mean.1, mean.2);
        let std = self.std();
        let _ = write!(out, "{}\t{}\t{}", std.0, std.1, std.2);
        out
    }
}

/// Runs the k-fold experiment over a labeled corpus.
pub struct CrossValidation {
    config: ExperimentConfig,
}

impl CrossValidation {
    #[must_use]
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Run all folds and collect the report.
    ///
    /// The encoder is frozen, so pooled features are computed once per
    /// article and reused across folds; only the head is retrained.
    pub fn run(
        &self,
        articles: &[Article],
        seq_encoder: &SequenceEncoder,
        encoder: &Encoder,
    ) -> Result<ExperimentReport> {
        self.config.validate()?;

        let labels: Vec<u8> = articles.iter().map(|a| a.label).collect();
        let splits = StratifiedKFold::new(self.config.n_folds)?.split(&labels)?;

        let pooled: Vec<PooledExample> = articles
            .iter()
            .map(|article| {
                let seq = seq_encoder.encode(article.text(self.config.text_field));
                PooledExample {
                    features: encoder.pooled(&seq),
                    label: article.label,
                }
            })
            .collect();

        let rep_dim = encoder.config().hidden_size;
        let mut folds = Vec::with_capacity(splits.len());
        for split in &splits {
            println!();
            let train_set: Vec<PooledExample> =
                split.train.iter().map(|&ix| pooled[ix].clone()).collect();
            let valid_set: Vec<PooledExample> =
                split.valid.iter().map(|&ix| pooled[ix].clone()).collect();

            let mut trainer = FoldTrainer::new(self.config.training_config(), rep_dim);
            folds.push(trainer.run(&train_set, &valid_set));
        }

        Ok(ExperimentReport { folds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fold(f1: f64, acc: f64, loss: f64) -> FoldResult {
        FoldResult {
            f1,
            accuracy: acc,
            loss,
            best_f1: f1,
        }
    }

    #[test]
    fn test_mean_and_population_std() {
        let report = ExperimentReport {
            folds: vec![fold(0.8, 0.8, 0.5), fold(0.6, 0.7, 0.7)],
        };
        let mean = report.mean();
        assert_relative_eq!(mean.0, 0.7);
        assert_relative_eq!(mean.1, 0.75);
        assert_relative_eq!(mean.2, 0.6);

        let std = report.std();
        // Population std over two values is half their spread
        assert_relative_eq!(std.0, 0.1, epsilon = 1e-12);
        assert_relative_eq!(std.1, 0.05, epsilon = 1e-12);
        assert_relative_eq!(std.2, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_render_layout() {
        let report = ExperimentReport {
            folds: vec![fold(1.0, 1.0, 0.0), fold(1.0, 1.0, 0.0)],
        };
        let rendered = report.render();
        let lines: Vec<&str> = rendered.lines().collect();
        // Two fold rows, one mean row, one std row
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "1\t1\t0");
        assert_eq!(lines[2], "1\t1\t0");
        assert_eq!(lines[3], "0\t0\t0");
        for line in lines {
            assert_eq!(line.split('\t').count(), 3);
        }
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = ExperimentConfig {
            batch_size: 0,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_checkpoints_per_epoch_is_rejected() {
        let config = ExperimentConfig {
            checkpoints_per_epoch: 0,
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_validates() {
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_defaults_match_training_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.n_folds, 5);
        assert_eq!(config.max_seq_len, 512);
        let tc = config.training_config();
        assert_eq!(tc.n_epochs, 10);
        assert_eq!(tc.batch_size, 8);
        assert_relative_eq!(tc.learn_rate, 1e-5f32);
        assert_relative_eq!(tc.weight_decay, 1e-3f32);
    }
}
