//! Forecast engine: store + provider -> forecast.

use crate::error::Result;
use crate::forecaster::{rollout, seed_window};
use serde::{Deserialize, Serialize};
use sibyl_checkpoint::ArtifactStore;
use sibyl_data::{PriceProvider, TimeSeries};

/// An ordered multi-step forecast in original currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Symbol the forecast is for.
    pub symbol: String,
    /// Number of days forecast.
    pub horizon: usize,
    /// Predicted closing prices, nearest day first. Each entry corresponds
    /// to one day after the last observed date.
    pub prices: Vec<f64>,
    /// The last observed date the forecast extends from, if known.
    pub last_observed_date: Option<String>,
}

/// Ties an artifact store and a price provider into a one-call forecast
/// service.
///
/// Loaded artifacts are immutable values: concurrent forecasts for the
/// same symbol each load their own copy and share nothing mutable.
#[derive(Debug, Clone)]
pub struct ForecastEngine<S, P> {
    store: S,
    provider: P,
}

impl<S: ArtifactStore, P: PriceProvider> ForecastEngine<S, P> {
    /// Creates an engine over the given collaborators.
    pub fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    /// Forecasts the next `horizon` closes for a symbol.
    ///
    /// Loads the trained model/scaler pair, fetches the recent history,
    /// seeds the rollout with the last lookback window, and returns
    /// denormalized prices.
    ///
    /// # Errors
    ///
    /// Fails with [`ArtifactError::NotFound`](sibyl_checkpoint::ArtifactError::NotFound)
    /// when no model has been trained for the symbol, plus any data or
    /// rollout error.
    pub fn forecast(&self, symbol: &str, horizon: usize) -> Result<ForecastResult> {
        let artifact = self.store.load(symbol)?;
        let model = artifact.model.build_model()?;
        let scaler = artifact.scaler.build_scaler();

        let bars = self.provider.history(symbol)?;
        let series = TimeSeries::from_bars(&bars)?;
        let seed = seed_window(&scaler, &series, model.lookback())?;

        let prices = rollout(&model, &scaler, &seed, horizon)?;

        tracing::info!(
            symbol,
            horizon,
            last_observed = series.last_date().unwrap_or("-"),
            "Forecast generated"
        );

        Ok(ForecastResult {
            symbol: artifact.symbol().to_string(),
            horizon,
            prices,
            last_observed_date: series.last_date().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_checkpoint::{
        ArtifactError, FsArtifactStore, ModelArtifact, ScalerArtifact, TrainedArtifact,
    };
    use sibyl_data::{CsvBarProvider, ScalerState};
    use sibyl_layers::RegressorConfig;
    use std::io::Write;

    const LOOKBACK: usize = 10;

    fn store_with_artifact(dir: &std::path::Path, symbol: &str) -> FsArtifactStore {
        let model = RegressorConfig::new(LOOKBACK)
            .with_hidden_sizes(&[6])
            .with_seed(42)
            .build()
            .unwrap();
        let artifact = TrainedArtifact::new(
            ModelArtifact::from_model(symbol, &model, 1, 0.02),
            ScalerArtifact::new(symbol, ScalerState { min: 100.0, max: 200.0 }),
        );
        let store = FsArtifactStore::new(dir);
        store.save(&artifact).unwrap();
        store
    }

    fn provider_with_history(dir: &std::path::Path, symbol: &str, days: usize) -> CsvBarProvider {
        let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
        for i in 0..days {
            let close = 100.0 + i as f64;
            csv.push_str(&format!(
                "2024-{:04},{c},{c},{c},{c},1000\n",
                i,
                c = close
            ));
        }
        let mut file = std::fs::File::create(dir.join(format!("{}.csv", symbol))).unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        CsvBarProvider::new(dir)
    }

    #[test]
    fn test_engine_forecast() {
        let artifacts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let store = store_with_artifact(artifacts.path(), "AAPL");
        let provider = provider_with_history(data.path(), "AAPL", 40);
        let engine = ForecastEngine::new(store, provider);

        let result = engine.forecast("AAPL", 30).unwrap();
        assert_eq!(result.symbol, "AAPL");
        assert_eq!(result.horizon, 30);
        assert_eq!(result.prices.len(), 30);
        assert!(result.prices.iter().all(|p| p.is_finite()));
        assert_eq!(result.last_observed_date.as_deref(), Some("2024-0039"));
    }

    #[test]
    fn test_engine_untrained_symbol() {
        let artifacts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let store = FsArtifactStore::new(artifacts.path());
        let provider = provider_with_history(data.path(), "AAPL", 40);
        let engine = ForecastEngine::new(store, provider);

        let err = engine.forecast("AAPL", 5).unwrap_err();
        assert!(matches!(
            err,
            crate::ForecastError::Artifact(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_engine_history_shorter_than_lookback() {
        let artifacts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let store = store_with_artifact(artifacts.path(), "AAPL");
        let provider = provider_with_history(data.path(), "AAPL", LOOKBACK - 1);
        let engine = ForecastEngine::new(store, provider);

        assert!(engine.forecast("AAPL", 5).is_err());
    }
}
