//! Neural network layers for Sibyl.
//!
//! This crate provides the building blocks of the price-series regressor:
//!
//! - **Tensor**: a small row-major multi-dimensional array type
//! - **Dense layers**: fully connected linear transformations
//! - **Lstm**: a recurrent layer with full backpropagation through time
//! - **Dropout**: inverted dropout for regularization during training
//! - **SequenceRegressor**: the stacked sequence-to-one model used for
//!   next-step price prediction
//!
//! # Quick Start
//!
//! ```
//! use sibyl_layers::prelude::*;
//!
//! // Three stacked LSTM layers with dropout, projecting to one scalar.
//! let model = RegressorConfig::new(60)
//!     .with_hidden_sizes(&[50, 50, 50])
//!     .with_dropout(0.2)
//!     .build()
//!     .unwrap();
//!
//! let window = Tensor::zeros(&[4, 60, 1]); // batch of 4 lookback windows
//! let prediction = model.forward(&window).unwrap();
//! assert_eq!(prediction.shape(), &[4, 1]);
//! ```
//!
//! # Layer Trait
//!
//! All layers implement the [`Layer`] trait, which provides a unified
//! interface for forward passes, backward passes, and parameter access:
//!
//! ```
//! use sibyl_layers::prelude::*;
//!
//! fn parameter_count<L: Layer>(layer: &L) -> usize {
//!     layer.parameters().iter().map(|p| p.numel()).sum()
//! }
//! ```

#![warn(missing_docs)]

pub mod dense;
pub mod dropout;
pub mod error;
pub mod layer;
pub mod lstm;
pub mod regressor;
pub mod tensor;

pub use dense::Dense;
pub use dropout::Dropout;
pub use error::LayerError;
pub use layer::Layer;
pub use lstm::Lstm;
pub use regressor::{RegressorConfig, SequenceRegressor};
pub use tensor::Tensor;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::dense::Dense;
    pub use crate::dropout::Dropout;
    pub use crate::error::LayerError;
    pub use crate::layer::Layer;
    pub use crate::lstm::Lstm;
    pub use crate::regressor::{RegressorConfig, SequenceRegressor};
    pub use crate::tensor::Tensor;
}
