//! `sibyl train` command.

use crate::CliResult;
use anyhow::{anyhow, Context};
use clap::Args;
use sibyl_checkpoint::{ArtifactStore, FsArtifactStore, ModelArtifact, ScalerArtifact, TrainedArtifact};
use sibyl_data::{CsvBarProvider, PriceProvider, TimeSeries};
use sibyl_training::{Trainer, TrainerConfig};
use std::path::PathBuf;
use tracing::{error, info};

/// Train a forecasting model for one or more symbols.
///
/// Each symbol trains independently; a failure for one symbol (short
/// history, constant prices, divergence) is reported and the sweep moves
/// on to the next.
#[derive(Args, Debug)]
pub struct TrainCommand {
    /// Symbols to train, e.g. AAPL MSFT GOOGL
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Directory with one <SYMBOL>.csv history file per symbol
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory to write trained artifacts into
    #[arg(long, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Maximum number of training epochs
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Mini-batch size
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Lookback window length (past days per prediction)
    #[arg(long, default_value_t = 60)]
    pub lookback: usize,

    /// Early stopping patience in epochs (0 disables)
    #[arg(long, default_value_t = 10)]
    pub patience: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f32,

    /// Seed for the split, weight init, and dropout
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl TrainCommand {
    /// Runs the training sweep.
    pub fn run(&self) -> CliResult<()> {
        let config = TrainerConfig {
            lookback: self.lookback,
            epochs: self.epochs,
            batch_size: self.batch_size,
            patience: self.patience,
            learning_rate: self.learning_rate,
            seed: self.seed,
            ..TrainerConfig::default()
        };
        let trainer = Trainer::new(config)?;
        let provider = CsvBarProvider::new(&self.data_dir);
        let store = FsArtifactStore::new(&self.artifacts_dir);

        let mut trained = 0usize;
        for symbol in &self.symbols {
            info!(symbol, "Training model");
            match self.train_one(&trainer, &provider, &store, symbol) {
                Ok(best_val_loss) => {
                    trained += 1;
                    println!(
                        "{}: trained, best validation loss {:.6}",
                        symbol, best_val_loss
                    );
                }
                Err(e) => {
                    error!(symbol, error = %e, "Training failed");
                    println!("{}: failed ({})", symbol, e);
                }
            }
        }

        if trained == 0 {
            return Err(anyhow!("no symbol trained successfully"));
        }
        println!("Trained {}/{} symbols", trained, self.symbols.len());
        Ok(())
    }

    fn train_one(
        &self,
        trainer: &Trainer,
        provider: &CsvBarProvider,
        store: &FsArtifactStore,
        symbol: &str,
    ) -> CliResult<f64> {
        let bars = provider.history(symbol)?;
        let series = TimeSeries::from_bars(&bars)?;

        let outcome = trainer.fit(symbol, &series)?;
        let scaler_state = *outcome
            .scaler
            .state()
            .ok_or_else(|| anyhow!("trainer returned an unfitted scaler"))?;

        let artifact = TrainedArtifact::new(
            ModelArtifact::from_model(
                symbol,
                &outcome.model,
                outcome.best_epoch,
                outcome.best_val_loss,
            ),
            ScalerArtifact::new(symbol, scaler_state),
        );
        store
            .save(&artifact)
            .with_context(|| format!("saving artifact for {}", symbol))?;

        Ok(outcome.best_val_loss)
    }
}
