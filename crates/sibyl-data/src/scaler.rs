//! Min-max normalization for price series.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// The fitted parameters of a [`MinMaxScaler`].
///
/// Persisted alongside the model it was fit for: inference against a
/// mismatched scaler produces meaningless prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    /// Minimum of the fitting series.
    pub min: f64,
    /// Maximum of the fitting series. Invariant: `max > min`.
    pub max: f64,
}

/// A fit-once, invertible min-max transform mapping the fitting series
/// into `[0, 1]`.
///
/// `transform` is not clamped: values outside the fitting range map
/// outside `[0, 1]`, which is honest extrapolation rather than an error.
///
/// # Example
///
/// ```
/// use sibyl_data::MinMaxScaler;
///
/// let mut scaler = MinMaxScaler::new();
/// scaler.fit(&[10.0, 20.0, 30.0]).unwrap();
///
/// assert_eq!(scaler.transform(20.0).unwrap(), 0.5);
/// assert_eq!(scaler.inverse_transform(0.5).unwrap(), 20.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    state: Option<ScalerState>,
}

impl MinMaxScaler {
    /// Creates an unfitted scaler.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Creates a scaler from previously persisted state.
    pub fn from_state(state: ScalerState) -> Self {
        Self { state: Some(state) }
    }

    /// Fits the scaler to a series, recording its min and max.
    ///
    /// Must be called exactly once, before any transform. Fitting an empty
    /// series fails with [`DataError::InsufficientData`]; a constant series
    /// fails with [`DataError::DegenerateSeries`] since the transform would
    /// divide by zero.
    pub fn fit(&mut self, series: &[f64]) -> Result<&ScalerState> {
        if series.is_empty() {
            return Err(DataError::InsufficientData {
                needed: 1,
                actual: 0,
            });
        }

        let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if max == min {
            return Err(DataError::DegenerateSeries { len: series.len() });
        }

        Ok(self.state.insert(ScalerState { min, max }))
    }

    /// Returns the fitted state, if any.
    pub fn state(&self) -> Option<&ScalerState> {
        self.state.as_ref()
    }

    fn fitted(&self) -> Result<&ScalerState> {
        self.state.as_ref().ok_or(DataError::NotFitted)
    }

    /// Maps a raw value into normalized space: `(x - min) / (max - min)`.
    pub fn transform(&self, x: f64) -> Result<f64> {
        let state = self.fitted()?;
        Ok((x - state.min) / (state.max - state.min))
    }

    /// Maps a normalized value back to raw space: `y * (max - min) + min`.
    ///
    /// Exact algebraic inverse of [`MinMaxScaler::transform`] for any
    /// finite input, not only values in `[0, 1]`.
    pub fn inverse_transform(&self, y: f64) -> Result<f64> {
        let state = self.fitted()?;
        Ok(y * (state.max - state.min) + state.min)
    }

    /// Transforms a whole slice.
    pub fn transform_slice(&self, values: &[f64]) -> Result<Vec<f64>> {
        let state = self.fitted()?;
        let range = state.max - state.min;
        Ok(values.iter().map(|x| (x - state.min) / range).collect())
    }

    /// Inverse-transforms a whole slice.
    pub fn inverse_transform_slice(&self, values: &[f64]) -> Result<Vec<f64>> {
        let state = self.fitted()?;
        let range = state.max - state.min;
        Ok(values.iter().map(|y| y * range + state.min).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let mut scaler = MinMaxScaler::new();
        let state = *scaler.fit(&[0.0, 5.0, 10.0]).unwrap();

        assert_eq!(state.min, 0.0);
        assert_eq!(state.max, 10.0);
        assert_eq!(scaler.transform(0.0).unwrap(), 0.0);
        assert_eq!(scaler.transform(5.0).unwrap(), 0.5);
        assert_eq!(scaler.transform(10.0).unwrap(), 1.0);
    }

    #[test]
    fn test_transform_is_not_clamped() {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&[0.0, 10.0]).unwrap();

        assert_eq!(scaler.transform(20.0).unwrap(), 2.0);
        assert_eq!(scaler.transform(-10.0).unwrap(), -1.0);
        assert_eq!(scaler.inverse_transform(2.0).unwrap(), 20.0);
    }

    #[test]
    fn test_round_trip_identity() {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&[37.5, 181.25, 94.0]).unwrap();

        for &x in &[37.5, 94.0, 181.25, 0.0, -50.0, 1e6, 0.3333] {
            let round_trip = scaler
                .inverse_transform(scaler.transform(x).unwrap())
                .unwrap();
            assert!(
                (round_trip - x).abs() < 1e-9 * x.abs().max(1.0),
                "round trip of {} gave {}",
                x,
                round_trip
            );
        }
    }

    #[test]
    fn test_fit_empty_series() {
        let mut scaler = MinMaxScaler::new();
        assert!(matches!(
            scaler.fit(&[]),
            Err(DataError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_fit_constant_series() {
        let mut scaler = MinMaxScaler::new();
        assert!(matches!(
            scaler.fit(&[42.0; 250]),
            Err(DataError::DegenerateSeries { len: 250 })
        ));
    }

    #[test]
    fn test_use_before_fit() {
        let scaler = MinMaxScaler::new();
        assert!(matches!(scaler.transform(1.0), Err(DataError::NotFitted)));
        assert!(matches!(
            scaler.inverse_transform(1.0),
            Err(DataError::NotFitted)
        ));
        assert!(matches!(
            scaler.transform_slice(&[1.0]),
            Err(DataError::NotFitted)
        ));
    }

    #[test]
    fn test_from_state_matches_fit() {
        let mut fitted = MinMaxScaler::new();
        fitted.fit(&[10.0, 20.0]).unwrap();

        let restored = MinMaxScaler::from_state(*fitted.state().unwrap());
        assert_eq!(
            fitted.transform(17.0).unwrap(),
            restored.transform(17.0).unwrap()
        );
    }

    #[test]
    fn test_slice_helpers() {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&[0.0, 10.0]).unwrap();

        let normalized = scaler.transform_slice(&[0.0, 2.5, 10.0]).unwrap();
        assert_eq!(normalized, vec![0.0, 0.25, 1.0]);

        let restored = scaler.inverse_transform_slice(&normalized).unwrap();
        assert_eq!(restored, vec![0.0, 2.5, 10.0]);
    }
}
