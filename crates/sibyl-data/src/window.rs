//! Supervised window generation.
//!
//! Converts a normalized series into (input window, target) pairs for
//! next-step training: window `i` holds `series[i..i+lookback]` as input
//! and `series[i+lookback]` as target.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// One supervised training example drawn from a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// `lookback` consecutive normalized observations.
    pub input: Vec<f64>,
    /// The observation immediately following the input.
    pub target: f64,
}

/// Generates all supervised windows from a normalized series.
///
/// Produces exactly `series.len() - lookback` windows in chronological
/// order (earliest window first). The split into train/validation sets is
/// the trainer's concern, not this function's.
///
/// # Errors
///
/// Fails with [`DataError::InsufficientData`] unless the series holds at
/// least `lookback + 1` observations (needed to form one window).
pub fn generate_windows(series: &[f64], lookback: usize) -> Result<Vec<Window>> {
    if series.len() <= lookback {
        return Err(DataError::InsufficientData {
            needed: lookback + 1,
            actual: series.len(),
        });
    }

    let count = series.len() - lookback;
    let mut windows = Vec::with_capacity(count);
    for i in 0..count {
        windows.push(Window {
            input: series[i..i + lookback].to_vec(),
            target: series[i + lookback],
        });
    }
    Ok(windows)
}
