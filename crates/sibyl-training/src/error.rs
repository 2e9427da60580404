//! Error types for training.

use sibyl_data::DataError;
use sibyl_layers::LayerError;
use thiserror::Error;

/// Errors produced by a training run.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Loss became non-finite during optimization. Fatal: the run aborts
    /// immediately and no artifact is produced.
    #[error("Training diverged for {symbol}: non-finite loss at epoch {epoch}")]
    Diverged {
        /// Symbol being trained.
        symbol: String,
        /// Epoch (0-indexed) at which the loss stopped being finite.
        epoch: usize,
    },

    /// Invalid trainer configuration.
    #[error("Invalid trainer configuration: {0}")]
    InvalidConfig(String),

    /// Data-shape failure (insufficient data, degenerate series, ...),
    /// detected before any epoch runs.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model construction or propagation failure.
    #[error("Model error during training: {0}")]
    Layer(#[from] LayerError),
}

/// A specialized Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;
