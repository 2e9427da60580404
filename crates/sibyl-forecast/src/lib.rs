//! Multi-step price forecasting for Sibyl.
//!
//! Given a trained model/scaler pair and the last observed lookback
//! window, [`rollout`] produces an N-step-ahead forecast by feeding each
//! prediction back in as the newest observation. [`ForecastEngine`] wires
//! the rollout to an [`ArtifactStore`](sibyl_checkpoint::ArtifactStore)
//! and a [`PriceProvider`](sibyl_data::PriceProvider) so callers can ask
//! for "the next N closes of symbol X" directly.

pub mod engine;
pub mod error;
pub mod forecaster;

pub use engine::{ForecastEngine, ForecastResult};
pub use error::{ForecastError, Result};
pub use forecaster::{rollout, seed_window};
