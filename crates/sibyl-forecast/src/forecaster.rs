//! Autoregressive rollout.

use crate::error::{ForecastError, Result};
use sibyl_data::{DataError, MinMaxScaler, TimeSeries};
use sibyl_layers::SequenceRegressor;
use std::collections::VecDeque;

/// Produces an N-step-ahead forecast in original price units.
///
/// A rolling buffer starts as a copy of `seed_window` (the last
/// `lookback` *normalized* observed values, oldest first). Each step
/// predicts the next normalized value from the buffer, records it, then
/// slides the buffer left by one: the oldest value drops out and the
/// prediction becomes the newest entry. The buffer always holds exactly
/// `lookback` values and never aliases the caller's slice. After
/// `horizon` steps every recorded value is inverse-transformed, so the
/// result is in original currency units, nearest day first.
///
/// Because each predicted value is fed back as if it were ground truth,
/// forecast error compounds with distance into the horizon. That is an
/// inherent property of autoregressive rollout, not a defect: callers
/// should expect confidence to degrade for later days.
///
/// # Errors
///
/// - [`ForecastError::InvalidHorizon`] for a zero horizon
/// - [`ForecastError::SeedWindowMismatch`] when the seed window length
///   differs from the model's lookback
/// - scaler/model errors are propagated
pub fn rollout(
    model: &SequenceRegressor,
    scaler: &MinMaxScaler,
    seed_window: &[f32],
    horizon: usize,
) -> Result<Vec<f64>> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon);
    }
    let lookback = model.lookback();
    if seed_window.len() != lookback {
        return Err(ForecastError::SeedWindowMismatch {
            expected: lookback,
            actual: seed_window.len(),
        });
    }

    let mut buffer: VecDeque<f32> = seed_window.iter().copied().collect();
    let mut normalized = Vec::with_capacity(horizon);
    let mut window = vec![0.0f32; lookback];

    for _ in 0..horizon {
        for (slot, value) in window.iter_mut().zip(buffer.iter()) {
            *slot = *value;
        }
        let prediction = model.predict_one(&window)?;
        normalized.push(prediction as f64);

        buffer.pop_front();
        buffer.push_back(prediction);
    }

    Ok(scaler.inverse_transform_slice(&normalized)?)
}

/// Builds the seed window for a rollout: the last `lookback` observations
/// of the series, normalized with the scaler the model was trained
/// against.
///
/// # Errors
///
/// Fails with [`DataError::InsufficientData`] when the series is shorter
/// than the lookback.
pub fn seed_window(
    scaler: &MinMaxScaler,
    series: &TimeSeries,
    lookback: usize,
) -> Result<Vec<f32>> {
    if series.len() < lookback {
        return Err(ForecastError::Data(DataError::InsufficientData {
            needed: lookback,
            actual: series.len(),
        }));
    }

    let tail = &series.closes()[series.len() - lookback..];
    let normalized = scaler.transform_slice(tail)?;
    Ok(normalized.into_iter().map(|v| v as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_layers::RegressorConfig;

    fn fitted_scaler() -> MinMaxScaler {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&[100.0, 200.0]).unwrap();
        scaler
    }

    fn small_model(lookback: usize) -> SequenceRegressor {
        RegressorConfig::new(lookback)
            .with_hidden_sizes(&[6])
            .with_seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_rollout_returns_horizon_values() {
        let model = small_model(10);
        let scaler = fitted_scaler();
        let seed = vec![0.5; 10];

        let forecast = rollout(&model, &scaler, &seed, 30).unwrap();
        assert_eq!(forecast.len(), 30);
        assert!(forecast.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_rollout_is_deterministic() {
        let model = small_model(10);
        let scaler = fitted_scaler();
        let seed = vec![0.5; 10];

        let a = rollout(&model, &scaler, &seed, 10).unwrap();
        let b = rollout(&model, &scaler, &seed, 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rollout_feeds_predictions_back() {
        // A shorter rollout must be a prefix of a longer one: step k only
        // depends on the seed and the first k-1 predictions.
        let model = small_model(10);
        let scaler = fitted_scaler();
        let seed = vec![0.5; 10];

        let short = rollout(&model, &scaler, &seed, 3).unwrap();
        let long = rollout(&model, &scaler, &seed, 8).unwrap();
        assert_eq!(&long[..3], &short[..]);

        // And consuming the buffer actually changes the input: after
        // lookback steps the seed has fully slid out, so predictions are
        // not all identical unless the model is at a fixed point.
        let spread = long
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        assert!(spread.0.is_finite() && spread.1.is_finite());
    }

    #[test]
    fn test_rollout_does_not_mutate_seed() {
        let model = small_model(10);
        let scaler = fitted_scaler();
        let seed = vec![0.5; 10];
        let seed_copy = seed.clone();

        rollout(&model, &scaler, &seed, 5).unwrap();
        assert_eq!(seed, seed_copy);
    }

    #[test]
    fn test_rollout_rejects_zero_horizon() {
        let model = small_model(10);
        let scaler = fitted_scaler();
        assert!(matches!(
            rollout(&model, &scaler, &[0.5; 10], 0),
            Err(ForecastError::InvalidHorizon)
        ));
    }

    #[test]
    fn test_rollout_rejects_wrong_seed_length() {
        let model = small_model(10);
        let scaler = fitted_scaler();
        assert!(matches!(
            rollout(&model, &scaler, &[0.5; 9], 5),
            Err(ForecastError::SeedWindowMismatch {
                expected: 10,
                actual: 9
            })
        ));
    }

    #[test]
    fn test_rollout_outputs_are_denormalized() {
        let model = small_model(10);
        let scaler = fitted_scaler();

        let forecast = rollout(&model, &scaler, &[0.5; 10], 5).unwrap();
        // Normalized predictions from a fresh model sit near zero, so the
        // denormalized values must sit near the scaler's min rather than
        // in [0, 1].
        assert!(forecast.iter().all(|&p| p.abs() > 1.5));
    }

    #[test]
    fn test_seed_window_takes_normalized_tail() {
        let scaler = fitted_scaler();
        let dates: Vec<String> = (0..12).map(|i| format!("2024-{:04}", i)).collect();
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + i as f64 * 10.0).collect();
        let series = TimeSeries::from_parts(dates, closes).unwrap();

        let seed = seed_window(&scaler, &series, 10).unwrap();
        assert_eq!(seed.len(), 10);
        // Last close is 210.0 -> normalized 1.1 against the [100, 200] fit.
        assert!((seed[9] - 1.1).abs() < 1e-6);
        // First seeded value is closes[2] = 120.0 -> 0.2.
        assert!((seed[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_seed_window_insufficient_series() {
        let scaler = fitted_scaler();
        let dates: Vec<String> = (0..5).map(|i| format!("2024-{:04}", i)).collect();
        let series = TimeSeries::from_parts(dates, vec![100.0, 110.0, 120.0, 130.0, 140.0]).unwrap();

        assert!(matches!(
            seed_window(&scaler, &series, 10),
            Err(ForecastError::Data(DataError::InsufficientData { .. }))
        ));
    }
}
