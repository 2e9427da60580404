//! Price bar record as delivered by a provider.

use serde::{Deserialize, Serialize};

/// A single daily price bar (OHLCV).
///
/// `close` may be non-finite when the provider has a gap for that day;
/// such bars are dropped when a [`TimeSeries`](crate::TimeSeries) is
/// built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// ISO-8601 date (`YYYY-MM-DD`).
    pub date: String,
    /// Opening price.
    pub open: f64,
    /// Daily high.
    pub high: f64,
    /// Daily low.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl PriceBar {
    /// Creates a new bar.
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
