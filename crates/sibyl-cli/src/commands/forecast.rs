//! `sibyl forecast` command.

use crate::CliResult;
use clap::Args;
use sibyl_checkpoint::FsArtifactStore;
use sibyl_data::CsvBarProvider;
use sibyl_forecast::ForecastEngine;
use std::path::PathBuf;
use tracing::info;

/// Forecast future closing prices for a trained symbol.
#[derive(Args, Debug)]
pub struct ForecastCommand {
    /// Symbol to forecast
    pub symbol: String,

    /// Number of days to forecast
    #[arg(long, default_value_t = 30)]
    pub horizon: usize,

    /// Directory with one <SYMBOL>.csv history file per symbol
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding trained artifacts
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,
}

impl ForecastCommand {
    /// Runs the forecast and prints one line per horizon day.
    pub fn run(&self) -> CliResult<()> {
        let engine = ForecastEngine::new(
            FsArtifactStore::new(&self.artifacts_dir),
            CsvBarProvider::new(&self.data_dir),
        );

        let result = engine.forecast(&self.symbol, self.horizon)?;
        info!(symbol = %result.symbol, horizon = result.horizon, "Forecast ready");

        if let Some(date) = &result.last_observed_date {
            println!("{} forecast from {} (+{} days):", result.symbol, date, result.horizon);
        } else {
            println!("{} forecast (+{} days):", result.symbol, result.horizon);
        }
        println!("{:<8} {:>12}", "Day", "Close");
        for (i, price) in result.prices.iter().enumerate() {
            println!("{:<8} {:>12.2}", format!("+{}", i + 1), price);
        }

        // Each prediction feeds the next, so uncertainty grows with the
        // day offset.
        println!("\nNote: accuracy degrades with distance into the horizon.");
        Ok(())
    }
}
