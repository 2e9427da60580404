//! Sibyl CLI Library
//!
//! This crate provides the command-line interface for Sibyl:
//!
//! - **Train**: fit a forecasting model per symbol and persist the artifact
//! - **Forecast**: produce an N-day forecast from a trained artifact
//!
//! # Example
//!
//! ```bash
//! # Train models for a few symbols from CSV history
//! sibyl train AAPL MSFT GOOGL --data-dir ./data --artifacts-dir ./artifacts
//!
//! # Forecast the next 30 days
//! sibyl forecast AAPL --horizon 30 --data-dir ./data --artifacts-dir ./artifacts
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{ForecastCommand, TrainCommand};

/// Sibyl - price-series forecasting with a trained sequence model
///
/// Provides tools for training per-symbol forecasting models and
/// generating multi-day price forecasts from persisted artifacts.
#[derive(Parser, Debug)]
#[command(name = "sibyl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a forecasting model for one or more symbols
    Train(TrainCommand),

    /// Forecast future closing prices for a trained symbol
    Forecast(ForecastCommand),
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;
