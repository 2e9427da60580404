//! End-to-end pipeline: train -> persist -> load -> forecast.

use sibyl_checkpoint::{
    ArtifactStore, FsArtifactStore, ModelArtifact, ScalerArtifact, TrainedArtifact,
};
use sibyl_data::{CsvBarProvider, TimeSeries};
use sibyl_forecast::{rollout, seed_window, ForecastEngine};
use sibyl_training::{Trainer, TrainerConfig};
use std::io::Write;

const LOOKBACK: usize = 8;

fn synthetic_closes(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.04)
        .collect()
}

fn synthetic_series(len: usize) -> TimeSeries {
    let dates: Vec<String> = (0..len).map(|i| format!("2020-{:04}", i)).collect();
    TimeSeries::from_parts(dates, synthetic_closes(len)).unwrap()
}

fn fast_config() -> TrainerConfig {
    TrainerConfig {
        lookback: LOOKBACK,
        epochs: 3,
        batch_size: 16,
        validation_fraction: 0.2,
        patience: 10,
        min_delta: 0.0,
        learning_rate: 0.005,
        hidden_sizes: vec![6],
        dropout: 0.1,
        seed: 42,
        min_observations: 100,
    }
}

fn write_history_csv(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
    let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
    for (i, close) in closes.iter().enumerate() {
        csv.push_str(&format!("2020-{:04},{c},{c},{c},{c},1000\n", i, c = close));
    }
    let mut file = std::fs::File::create(dir.join(format!("{}.csv", symbol))).unwrap();
    file.write_all(csv.as_bytes()).unwrap();
}

#[test]
fn full_pipeline_produces_a_forecast() {
    let series = synthetic_series(150);

    // Train.
    let trainer = Trainer::new(fast_config()).unwrap();
    let outcome = trainer.fit("SPY", &series).unwrap();
    assert!(!outcome.history.is_empty());

    // Persist the pair.
    let artifacts = tempfile::tempdir().unwrap();
    let store = FsArtifactStore::new(artifacts.path());
    let artifact = TrainedArtifact::new(
        ModelArtifact::from_model("SPY", &outcome.model, outcome.best_epoch, outcome.best_val_loss),
        ScalerArtifact::new("SPY", *outcome.scaler.state().unwrap()),
    );
    store.save(&artifact).unwrap();

    // Forecast through the engine, against the same history.
    let data = tempfile::tempdir().unwrap();
    write_history_csv(data.path(), "SPY", &synthetic_closes(150));
    let engine = ForecastEngine::new(store, CsvBarProvider::new(data.path()));

    let result = engine.forecast("SPY", 30).unwrap();
    assert_eq!(result.prices.len(), 30);
    assert!(result.prices.iter().all(|p| p.is_finite()));

    // Forecasts should stay within an order of magnitude of the observed
    // price range for a smooth series.
    for price in &result.prices {
        assert!(*price > 0.0 && *price < 1000.0, "implausible price {}", price);
    }
}

#[test]
fn loaded_artifact_forecasts_identically_to_in_memory_model() {
    let series = synthetic_series(140);
    let trainer = Trainer::new(fast_config()).unwrap();
    let outcome = trainer.fit("QQQ", &series).unwrap();

    let artifacts = tempfile::tempdir().unwrap();
    let store = FsArtifactStore::new(artifacts.path());
    store
        .save(&TrainedArtifact::new(
            ModelArtifact::from_model(
                "QQQ",
                &outcome.model,
                outcome.best_epoch,
                outcome.best_val_loss,
            ),
            ScalerArtifact::new("QQQ", *outcome.scaler.state().unwrap()),
        ))
        .unwrap();

    let seed = seed_window(&outcome.scaler, &series, LOOKBACK).unwrap();
    let direct = rollout(&outcome.model, &outcome.scaler, &seed, 10).unwrap();

    let loaded = store.load("QQQ").unwrap();
    let loaded_model = loaded.model.build_model().unwrap();
    let loaded_scaler = loaded.scaler.build_scaler();
    let seed2 = seed_window(&loaded_scaler, &series, LOOKBACK).unwrap();
    let via_store = rollout(&loaded_model, &loaded_scaler, &seed2, 10).unwrap();

    assert_eq!(direct.len(), via_store.len());
    for (a, b) in direct.iter().zip(via_store.iter()) {
        assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
    }
}
