//! Training loop for the Sibyl sequence regressor.
//!
//! [`Trainer::fit`] owns the whole fit pipeline: data-shape gates, scaler
//! fitting, window generation, the deterministic train/validation split,
//! mini-batch Adam epochs, per-epoch validation, and early stopping with
//! best-weight restoration. It returns an immutable
//! [`TrainingOutcome`] — model, fitted scaler, and loss history — and never
//! mutates a previously produced artifact.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rng;
pub mod split;
pub mod stopping;
pub mod trainer;

pub use config::TrainerConfig;
pub use error::{Result, TrainingError};
pub use metrics::EpochMetrics;
pub use split::{split_windows, SplitIndices};
pub use stopping::EarlyStopping;
pub use trainer::{Trainer, TrainingOutcome};
