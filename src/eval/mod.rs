//! Classification metrics for fold evaluation
//!
//! Confusion matrix, per-class precision/recall/F1, and the averaging
//! strategies needed to report sklearn-compatible weighted scores.

mod average;
mod confusion;
mod metrics;

pub use average::Average;
pub use confusion::ConfusionMatrix;
pub use metrics::MultiClassMetrics;
