//! Error types for forecasting.

use sibyl_checkpoint::ArtifactError;
use sibyl_data::DataError;
use sibyl_layers::LayerError;
use thiserror::Error;

/// Errors produced while generating a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The requested horizon is zero.
    #[error("Forecast horizon must be a positive number of days")]
    InvalidHorizon,

    /// The seed window does not match the model's lookback length.
    #[error("Seed window has {actual} values, model expects {expected}")]
    SeedWindowMismatch {
        /// Lookback length the model was trained with.
        expected: usize,
        /// Length of the provided seed window.
        actual: usize,
    },

    /// Artifact loading or rebuilding failure, including the
    /// "model not yet trained" case.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Data retrieval or preparation failure.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model propagation failure during rollout.
    #[error("Model error during rollout: {0}")]
    Layer(#[from] LayerError),
}

/// A specialized Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;
