//! Error types for data preparation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while fetching, validating, or transforming price data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Fewer observations than the operation requires.
    ///
    /// Recoverable by fetching a longer history.
    #[error("Insufficient data: need at least {needed} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations required.
        needed: usize,
        /// Number of observations actually available.
        actual: usize,
    },

    /// Every observation in the fitting series has the same value, so the
    /// min-max transform is undefined.
    #[error("Degenerate series: all {len} observations are equal, cannot fit scaler")]
    DegenerateSeries {
        /// Length of the offending series.
        len: usize,
    },

    /// A scaler was used before `fit` was called. This indicates a usage
    /// bug rather than bad input data.
    #[error("Scaler not fitted: call fit before transform/inverse_transform")]
    NotFitted,

    /// Observations are not in strictly increasing date order.
    #[error("Series out of order at date {date}: dates must be strictly increasing")]
    OutOfOrder {
        /// The date at which ordering broke (duplicate or regression).
        date: String,
    },

    /// The provider has no data for the requested symbol.
    #[error("No price data found for symbol {symbol}")]
    UnknownSymbol {
        /// The requested symbol.
        symbol: String,
    },

    /// I/O error while reading provider data.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::InsufficientData {
            needed: 100,
            actual: 99,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 100 observations, got 99"
        );

        let err = DataError::DegenerateSeries { len: 250 };
        assert_eq!(
            err.to_string(),
            "Degenerate series: all 250 observations are equal, cannot fit scaler"
        );

        let err = DataError::UnknownSymbol {
            symbol: "AAPL".to_string(),
        };
        assert_eq!(err.to_string(), "No price data found for symbol AAPL");
    }
}
