//! The fit loop.

use crate::config::TrainerConfig;
use crate::error::{Result, TrainingError};
use crate::metrics::EpochMetrics;
use crate::rng::RandomGenerator;
use crate::split::split_windows;
use crate::stopping::EarlyStopping;
use sibyl_data::{generate_windows, DataError, MinMaxScaler, TimeSeries, Window};
use sibyl_layers::{Layer, RegressorConfig, SequenceRegressor, Tensor};
use sibyl_optimizer::{Adam, Optimizer};

/// The immutable result of one training run.
///
/// The model and scaler are a matched pair: the model only produces
/// meaningful prices when its inputs are normalized with exactly this
/// scaler. A retrain produces a fresh outcome and never mutates an
/// existing one, so outcomes can be shared read-only across any number of
/// concurrent forecast calls.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The trained model, restored to the best-validation epoch.
    pub model: SequenceRegressor,
    /// The scaler fitted on the full training series.
    pub scaler: MinMaxScaler,
    /// Per-epoch train/validation losses, in epoch order.
    pub history: Vec<EpochMetrics>,
    /// Epoch whose weights the returned model carries.
    pub best_epoch: usize,
    /// Validation loss at `best_epoch`.
    pub best_val_loss: f64,
}

/// Orchestrates the fit pipeline for one symbol.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Creates a trainer after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] for degenerate settings.
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the trainer configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fits a model to the series and returns the trained artifact pair
    /// plus the loss history.
    ///
    /// The pipeline: data gate, scaler fit, window generation, seeded
    /// random train/validation split, mini-batch Adam epochs, per-epoch
    /// validation loss, early stopping with best-weight restoration.
    ///
    /// # Errors
    ///
    /// - [`DataError::InsufficientData`] if the series is shorter than
    ///   `min_observations` (checked before any computation)
    /// - [`DataError::DegenerateSeries`] for a constant series
    /// - [`TrainingError::Diverged`] as soon as any loss is non-finite;
    ///   no partial artifact escapes
    pub fn fit(&self, symbol: &str, series: &TimeSeries) -> Result<TrainingOutcome> {
        let config = &self.config;

        if series.len() < config.min_observations {
            return Err(DataError::InsufficientData {
                needed: config.min_observations,
                actual: series.len(),
            }
            .into());
        }

        let mut scaler = MinMaxScaler::new();
        scaler.fit(series.closes())?;
        let normalized = scaler.transform_slice(series.closes())?;
        let windows = generate_windows(&normalized, config.lookback)?;
        let split = split_windows(windows.len(), config.validation_fraction, config.seed);

        tracing::info!(
            symbol,
            observations = series.len(),
            windows = windows.len(),
            train = split.train.len(),
            validation = split.validation.len(),
            "Starting training"
        );

        let mut model = RegressorConfig::new(config.lookback)
            .with_hidden_sizes(&config.hidden_sizes)
            .with_dropout(config.dropout)
            .with_seed(config.seed)
            .build()?;

        let mut optimizers: Vec<Adam> = model
            .parameters()
            .iter()
            .map(|_| Adam::with_params(config.learning_rate, 0.9, 0.999, 1e-8))
            .collect();

        let mut shuffle_rng = RandomGenerator::new(config.seed.wrapping_add(1));
        let mut stopping = EarlyStopping::new(config.patience, config.min_delta);
        let mut best_snapshot = model.snapshot();
        let mut history = Vec::new();
        let mut train_indices = split.train.clone();

        for epoch in 0..config.epochs {
            shuffle_rng.shuffle(&mut train_indices);

            let mut loss_sum = 0.0;
            let mut sample_count = 0usize;
            for chunk in train_indices.chunks(config.batch_size) {
                let (x, y) = batch_tensors(&windows, chunk, config.lookback);

                let predictions = model.forward_train(&x)?;
                let batch_loss = batch_mse(&predictions, &y);
                if !batch_loss.is_finite() {
                    return Err(TrainingError::Diverged {
                        symbol: symbol.to_string(),
                        epoch,
                    });
                }
                loss_sum += batch_loss * chunk.len() as f64;
                sample_count += chunk.len();

                // dL/dpred for mean squared error over the batch.
                let grad = predictions.sub(&y).scale(2.0 / chunk.len() as f32);
                model.backward(&grad)?;
                apply_gradients(&mut model, &mut optimizers);
            }
            let train_loss = loss_sum / sample_count.max(1) as f64;

            let val_loss =
                validation_loss(&model, &windows, &split.validation, config.batch_size)?;
            if !val_loss.is_finite() {
                return Err(TrainingError::Diverged {
                    symbol: symbol.to_string(),
                    epoch,
                });
            }

            history.push(EpochMetrics {
                epoch,
                train_loss,
                val_loss,
            });
            tracing::debug!(symbol, epoch, train_loss, val_loss, "Epoch complete");

            let (improved, stop) = stopping.update(epoch, val_loss);
            if improved {
                best_snapshot = model.snapshot();
            }
            if stop {
                tracing::info!(
                    symbol,
                    epoch,
                    best_epoch = stopping.best_epoch(),
                    "Early stopping: no improvement for {} epochs",
                    config.patience
                );
                break;
            }
        }

        // Hand back the weights from the best epoch, not the last one.
        model.restore(&best_snapshot)?;

        tracing::info!(
            symbol,
            epochs_run = history.len(),
            best_epoch = stopping.best_epoch(),
            best_val_loss = stopping.best_loss(),
            "Training complete"
        );

        Ok(TrainingOutcome {
            model,
            scaler,
            history,
            best_epoch: stopping.best_epoch(),
            best_val_loss: stopping.best_loss(),
        })
    }
}

/// Builds `[batch, lookback, 1]` input and `[batch, 1]` target tensors for
/// the windows at the given indices.
fn batch_tensors(windows: &[Window], indices: &[usize], lookback: usize) -> (Tensor, Tensor) {
    let batch = indices.len();
    let mut x = Vec::with_capacity(batch * lookback);
    let mut y = Vec::with_capacity(batch);

    for &idx in indices {
        let window = &windows[idx];
        x.extend(window.input.iter().map(|&v| v as f32));
        y.push(window.target as f32);
    }

    (
        Tensor::from_data(&[batch, lookback, 1], x),
        Tensor::from_data(&[batch, 1], y),
    )
}

/// Mean squared error between prediction and target tensors, accumulated
/// in f64.
fn batch_mse(predictions: &Tensor, targets: &Tensor) -> f64 {
    let n = predictions.numel().max(1);
    predictions
        .data()
        .iter()
        .zip(targets.data().iter())
        .map(|(p, t)| {
            let d = (*p - *t) as f64;
            d * d
        })
        .sum::<f64>()
        / n as f64
}

/// Mean squared error of the model over the windows at `indices`, run in
/// inference mode (dropout inactive).
pub fn validation_loss(
    model: &SequenceRegressor,
    windows: &[Window],
    indices: &[usize],
    batch_size: usize,
) -> Result<f64> {
    let lookback = model.lookback();
    let mut actual = Vec::with_capacity(indices.len());
    let mut predicted = Vec::with_capacity(indices.len());

    for chunk in indices.chunks(batch_size.max(1)) {
        let (x, y) = batch_tensors(windows, chunk, lookback);
        let predictions = model.forward(&x)?;
        actual.extend(y.data().iter().map(|&v| v as f64));
        predicted.extend(predictions.data().iter().map(|&v| v as f64));
    }

    Ok(crate::metrics::mse(&actual, &predicted))
}

fn apply_gradients(model: &mut SequenceRegressor, optimizers: &mut [Adam]) {
    let grad_blobs: Vec<Vec<f32>> = model
        .gradients()
        .iter()
        .map(|g| g.data().to_vec())
        .collect();

    for ((param, optimizer), grad) in model
        .parameters_mut()
        .into_iter()
        .zip(optimizers.iter_mut())
        .zip(grad_blobs.iter())
    {
        optimizer.apply_gradients(param.data_mut(), grad);
    }
}
