//! Chronological closing-price series.

use crate::bar::PriceBar;
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// An ordered closing-price series with strictly increasing dates.
///
/// This is the source of truth for training and forecasting. It is
/// ephemeral: fetched per request from a provider and never persisted by
/// the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Observation dates, ISO-8601, strictly increasing.
    dates: Vec<String>,
    /// Closing prices, parallel to `dates`, all finite.
    closes: Vec<f64>,
}

impl TimeSeries {
    /// Builds a series from provider bars.
    ///
    /// Bars with non-finite closes are dropped (provider gaps). The
    /// surviving dates must be strictly increasing; a duplicate or
    /// out-of-order date fails with [`DataError::OutOfOrder`].
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self> {
        let mut dates: Vec<String> = Vec::with_capacity(bars.len());
        let mut closes = Vec::with_capacity(bars.len());

        for bar in bars {
            if !bar.close.is_finite() {
                tracing::debug!(date = %bar.date, "Dropping bar with non-finite close");
                continue;
            }
            if let Some(prev) = dates.last() {
                // ISO dates order lexicographically.
                if bar.date.as_str() <= prev.as_str() {
                    return Err(DataError::OutOfOrder {
                        date: bar.date.clone(),
                    });
                }
            }
            dates.push(bar.date.clone());
            closes.push(bar.close);
        }

        Ok(Self { dates, closes })
    }

    /// Builds a series directly from parallel date/close vectors.
    ///
    /// Mostly useful in tests; applies the same ordering validation as
    /// [`TimeSeries::from_bars`].
    pub fn from_parts(dates: Vec<String>, closes: Vec<f64>) -> Result<Self> {
        let bars: Vec<PriceBar> = dates
            .into_iter()
            .zip(closes)
            .map(|(date, close)| PriceBar::new(date, close, close, close, close, 0.0))
            .collect();
        Self::from_bars(&bars)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns true when the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// The closing prices in chronological order.
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// The observation dates in chronological order.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// The last observed date, if any.
    pub fn last_date(&self) -> Option<&str> {
        self.dates.last().map(String::as_str)
    }
}
