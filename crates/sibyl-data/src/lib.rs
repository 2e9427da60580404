//! Price-series data handling for Sibyl.
//!
//! This crate owns everything between a market-data provider and the
//! training loop:
//!
//! - [`PriceBar`] / [`TimeSeries`]: chronological closing-price series
//! - [`PriceProvider`] / [`CsvBarProvider`]: the provider boundary
//! - [`MinMaxScaler`]: the fit-once invertible normalization transform
//! - [`generate_windows`]: supervised (input window, target) pairs
//!
//! The provider is an external collaborator: the core only assumes it
//! returns chronological bars for a symbol. Missing or non-finite closes
//! are dropped when a [`TimeSeries`] is built, before any windowing.

pub mod bar;
pub mod error;
pub mod provider;
pub mod scaler;
pub mod series;
pub mod window;

pub use bar::PriceBar;
pub use error::{DataError, Result};
pub use provider::{CsvBarProvider, PriceProvider};
pub use scaler::{MinMaxScaler, ScalerState};
pub use series::TimeSeries;
pub use window::{generate_windows, Window};
