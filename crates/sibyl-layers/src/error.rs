//! Error types for layer operations.

use thiserror::Error;

/// Errors produced by layer construction and propagation.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Shape mismatch between expected and actual tensor shapes.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The expected shape
        expected: Vec<usize>,
        /// The actual shape that was provided
        actual: Vec<usize>,
    },

    /// Invalid input dimension for the layer.
    #[error("Invalid input dimension: expected {expected}, got {actual}")]
    InvalidInputDimension {
        /// The expected input dimension
        expected: usize,
        /// The actual input dimension
        actual: usize,
    },

    /// Error during forward pass computation.
    #[error("Forward pass error: {message}")]
    ForwardError {
        /// Description of the forward pass error
        message: String,
    },

    /// Error during backward pass computation.
    #[error("Backward pass error: {message}")]
    BackwardError {
        /// Description of the backward pass error
        message: String,
    },

    /// Backward pass was called before a cached forward pass.
    #[error("Layer not initialized: forward_train must be called before backward")]
    NotInitialized,

    /// Configuration error for the layer or model.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A named weight blob is missing or has the wrong length.
    #[error("Invalid weights for '{name}': expected {expected} values, got {actual}")]
    InvalidWeights {
        /// Name of the parameter tensor
        name: String,
        /// Expected number of values
        expected: usize,
        /// Number of values provided
        actual: usize,
    },
}

/// A specialized Result type for layer operations.
pub type Result<T> = std::result::Result<T, LayerError>;
