//! Provider boundary for historical price bars.
//!
//! The core treats market data retrieval as an external collaborator: it
//! only assumes a [`PriceProvider`] returns chronological bars for a
//! symbol. [`CsvBarProvider`] is the bundled implementation, reading one
//! CSV file per symbol from a data directory.

use crate::bar::PriceBar;
use crate::error::{DataError, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Source of historical price bars for a symbol.
pub trait PriceProvider {
    /// Returns the full chronological bar history for `symbol`.
    ///
    /// # Errors
    ///
    /// Fails with [`DataError::UnknownSymbol`] when the provider has no
    /// data for the symbol, or an I/O error variant when retrieval fails.
    fn history(&self, symbol: &str) -> Result<Vec<PriceBar>>;
}

/// Reads bars from `<data_dir>/<SYMBOL>.csv`.
///
/// Supported header layouts (detected from the header line):
/// 1. `Date,Open,High,Low,Close,Adj Close,Volume` (Yahoo Finance export)
/// 2. `Date,Open,High,Low,Close,Volume`
///
/// Rows with too few fields are skipped; an unparsable close becomes a
/// NaN bar so that downstream series construction drops it as a gap.
#[derive(Debug, Clone)]
pub struct CsvBarProvider {
    /// Base directory containing one CSV file per symbol.
    data_dir: PathBuf,
}

impl CsvBarProvider {
    /// Creates a provider rooted at the given directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the directory this provider reads from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn parse_field(fields: &[&str], index: usize) -> f64 {
        fields
            .get(index)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }
}

impl PriceProvider for CsvBarProvider {
    fn history(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let path = self.data_dir.join(format!("{}.csv", symbol.to_uppercase()));
        if !path.exists() {
            return Err(DataError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        }

        let file = std::fs::File::open(&path).map_err(|e| DataError::Io {
            path: path.clone(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line.map_err(|e| DataError::Io {
                path: path.clone(),
                source: e,
            })?,
            None => String::new(),
        };
        let has_adj_close = header.to_lowercase().contains("adj close");
        let volume_index = if has_adj_close { 6 } else { 5 };

        let mut bars = Vec::new();
        for line in lines {
            let line = line.map_err(|e| DataError::Io {
                path: path.clone(),
                source: e,
            })?;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 6 {
                continue;
            }

            bars.push(PriceBar {
                date: fields[0].trim().to_string(),
                open: Self::parse_field(&fields, 1),
                high: Self::parse_field(&fields, 2),
                low: Self::parse_field(&fields, 3),
                close: Self::parse_field(&fields, 4),
                volume: Self::parse_field(&fields, volume_index),
            });
        }

        tracing::debug!(
            symbol,
            bars = bars.len(),
            path = %path.display(),
            "Loaded bar history"
        );

        Ok(bars)
    }
}
