//! Stacked sequence-to-one regressor.
//!
//! This module provides [`SequenceRegressor`], the model used for
//! next-step price prediction: stacked LSTM layers interleaved with
//! dropout, followed by a dense projection of the last hidden state to a
//! single scalar.

use crate::dense::Dense;
use crate::dropout::Dropout;
use crate::error::LayerError;
use crate::layer::Layer;
use crate::lstm::Lstm;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the tensors within one LSTM layer, in parameter order.
const LSTM_PARAM_NAMES: [&str; 12] = [
    "w_xi", "w_hi", "b_i", "w_xf", "w_hf", "b_f", "w_xg", "w_hg", "b_g", "w_xo", "w_ho", "b_o",
];

/// Configuration for a [`SequenceRegressor`].
///
/// # Example
///
/// ```
/// use sibyl_layers::regressor::RegressorConfig;
///
/// let config = RegressorConfig::new(60)
///     .with_hidden_sizes(&[50, 50, 50])
///     .with_dropout(0.2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorConfig {
    /// Number of past observations fed into the model.
    pub lookback: usize,
    /// Number of features per observation (1 for a univariate series).
    pub input_dim: usize,
    /// Hidden size of each stacked recurrent layer.
    pub hidden_sizes: Vec<usize>,
    /// Dropout rate applied after each recurrent layer.
    pub dropout: f32,
    /// Seed for weight initialization and dropout masks.
    pub seed: u64,
}

impl RegressorConfig {
    /// Creates a configuration with the default architecture: three
    /// stacked layers of 50 units with dropout 0.2.
    pub fn new(lookback: usize) -> Self {
        Self {
            lookback,
            input_dim: 1,
            hidden_sizes: vec![50, 50, 50],
            dropout: 0.2,
            seed: 42,
        }
    }

    /// Sets the hidden layer sizes.
    pub fn with_hidden_sizes(mut self, sizes: &[usize]) -> Self {
        self.hidden_sizes = sizes.to_vec();
        self
    }

    /// Sets the dropout rate.
    pub fn with_dropout(mut self, rate: f32) -> Self {
        self.dropout = rate;
        self
    }

    /// Sets the initialization seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::ConfigError`] when any dimension is zero or
    /// the dropout rate is outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), LayerError> {
        if self.lookback == 0 {
            return Err(LayerError::ConfigError {
                message: "Lookback must be positive".to_string(),
            });
        }
        if self.input_dim == 0 {
            return Err(LayerError::ConfigError {
                message: "Input dimension must be positive".to_string(),
            });
        }
        if self.hidden_sizes.is_empty() {
            return Err(LayerError::ConfigError {
                message: "Regressor must have at least one recurrent layer".to_string(),
            });
        }
        for (i, size) in self.hidden_sizes.iter().enumerate() {
            if *size == 0 {
                return Err(LayerError::ConfigError {
                    message: format!("Layer {} has zero hidden size", i),
                });
            }
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(LayerError::ConfigError {
                message: "Dropout rate must be in [0, 1)".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the regressor from this configuration.
    pub fn build(self) -> Result<SequenceRegressor, LayerError> {
        SequenceRegressor::from_config(self)
    }
}

/// A sequence-to-one regressor mapping `[batch, lookback, input_dim]`
/// windows to `[batch, 1]` predictions.
///
/// The stack mirrors the layer ordering of the original predictor: every
/// recurrent layer except the last emits the full hidden sequence for the
/// next layer to consume, and dropout sits between each pair of layers
/// and before the output projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRegressor {
    /// Stacked recurrent layers
    lstm_layers: Vec<Lstm>,
    /// One dropout layer after each recurrent layer
    dropouts: Vec<Dropout>,
    /// Projection of the last hidden state to one scalar
    output: Dense,
    /// Configuration used to build this model
    config: RegressorConfig,
}

impl SequenceRegressor {
    /// Creates a regressor from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: RegressorConfig) -> Result<Self, LayerError> {
        config.validate()?;

        let mut lstm_layers = Vec::with_capacity(config.hidden_sizes.len());
        let mut dropouts = Vec::with_capacity(config.hidden_sizes.len());

        let last = config.hidden_sizes.len() - 1;
        let mut prev_dim = config.input_dim;
        for (idx, &hidden) in config.hidden_sizes.iter().enumerate() {
            let lstm_seed = config.seed.wrapping_add(17 * (idx as u64 + 1));
            let dropout_seed = config.seed.wrapping_add(29 * (idx as u64 + 1));

            lstm_layers.push(
                Lstm::new(prev_dim, hidden, lstm_seed).with_return_sequences(idx < last),
            );
            dropouts.push(Dropout::new(config.dropout, dropout_seed)?);
            prev_dim = hidden;
        }

        let output = Dense::new(prev_dim, 1, config.seed.wrapping_add(97));

        Ok(Self {
            lstm_layers,
            dropouts,
            output,
            config,
        })
    }

    /// Returns the configuration used to build this model.
    pub fn config(&self) -> &RegressorConfig {
        &self.config
    }

    /// Returns the lookback window length the model expects.
    pub fn lookback(&self) -> usize {
        self.config.lookback
    }

    /// Predicts the next normalized value from a single lookback window.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `window` does not hold exactly
    /// `lookback * input_dim` values.
    pub fn predict_one(&self, window: &[f32]) -> Result<f32, LayerError> {
        let expected = self.config.lookback * self.config.input_dim;
        if window.len() != expected {
            return Err(LayerError::ShapeMismatch {
                expected: vec![expected],
                actual: vec![window.len()],
            });
        }
        let input = Tensor::from_data(
            &[1, self.config.lookback, self.config.input_dim],
            window.to_vec(),
        );
        let output = self.forward(&input)?;
        Ok(output.data()[0])
    }

    /// Returns the parameter names aligned with [`Layer::parameters`].
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for idx in 0..self.lstm_layers.len() {
            for name in LSTM_PARAM_NAMES {
                names.push(format!("lstm{}.{}", idx, name));
            }
        }
        names.push("output.weights".to_string());
        names.push("output.bias".to_string());
        names
    }

    /// Exports all weights as named blobs for persistence.
    pub fn export_weights(&self) -> HashMap<String, Vec<f32>> {
        self.parameter_names()
            .into_iter()
            .zip(self.parameters())
            .map(|(name, tensor)| (name, tensor.data().to_vec()))
            .collect()
    }

    /// Loads weights from named blobs produced by
    /// [`SequenceRegressor::export_weights`].
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidWeights`] if any blob is missing or has
    /// the wrong length for this architecture.
    pub fn import_weights(&mut self, weights: &HashMap<String, Vec<f32>>) -> Result<(), LayerError> {
        let names = self.parameter_names();
        for (name, param) in names.into_iter().zip(self.parameters_mut()) {
            let blob = weights.get(&name).ok_or_else(|| LayerError::InvalidWeights {
                name: name.clone(),
                expected: param.numel(),
                actual: 0,
            })?;
            if blob.len() != param.numel() {
                return Err(LayerError::InvalidWeights {
                    name,
                    expected: param.numel(),
                    actual: blob.len(),
                });
            }
            param.data_mut().copy_from_slice(blob);
        }
        Ok(())
    }

    /// Takes a snapshot of all parameter values, in parameter order.
    pub fn snapshot(&self) -> Vec<Vec<f32>> {
        self.parameters()
            .iter()
            .map(|p| p.data().to_vec())
            .collect()
    }

    /// Restores parameter values from a snapshot taken on this model.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidWeights`] on any length mismatch.
    pub fn restore(&mut self, snapshot: &[Vec<f32>]) -> Result<(), LayerError> {
        let params = self.parameters_mut();
        if snapshot.len() != params.len() {
            return Err(LayerError::InvalidWeights {
                name: "snapshot".to_string(),
                expected: params.len(),
                actual: snapshot.len(),
            });
        }
        for (param, values) in params.into_iter().zip(snapshot) {
            if values.len() != param.numel() {
                return Err(LayerError::InvalidWeights {
                    name: "snapshot".to_string(),
                    expected: param.numel(),
                    actual: values.len(),
                });
            }
            param.data_mut().copy_from_slice(values);
        }
        Ok(())
    }
}

impl Layer for SequenceRegressor {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        let mut x = input.clone();
        for (lstm, dropout) in self.lstm_layers.iter().zip(self.dropouts.iter()) {
            x = lstm.forward(&x)?;
            x = dropout.forward(&x)?;
        }
        self.output.forward(&x)
    }

    fn forward_train(&mut self, input: &Tensor) -> Result<Tensor, LayerError> {
        let mut x = input.clone();
        for (lstm, dropout) in self
            .lstm_layers
            .iter_mut()
            .zip(self.dropouts.iter_mut())
        {
            x = lstm.forward_train(&x)?;
            x = dropout.forward_train(&x)?;
        }
        self.output.forward_train(&x)
    }

    fn backward(&mut self, grad: &Tensor) -> Result<Tensor, LayerError> {
        let mut g = self.output.backward(grad)?;
        for (lstm, dropout) in self
            .lstm_layers
            .iter_mut()
            .zip(self.dropouts.iter_mut())
            .rev()
        {
            g = dropout.backward(&g)?;
            g = lstm.backward(&g)?;
        }
        Ok(g)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params: Vec<&Tensor> = self
            .lstm_layers
            .iter()
            .flat_map(|layer| layer.parameters())
            .collect();
        params.extend(self.output.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params: Vec<&mut Tensor> = self
            .lstm_layers
            .iter_mut()
            .flat_map(|layer| layer.parameters_mut())
            .collect();
        params.extend(self.output.parameters_mut());
        params
    }

    fn gradients(&self) -> Vec<&Tensor> {
        let mut grads: Vec<&Tensor> = self
            .lstm_layers
            .iter()
            .flat_map(|layer| layer.gradients())
            .collect();
        grads.extend(self.output.gradients());
        grads
    }

    fn name(&self) -> &str {
        "SequenceRegressor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RegressorConfig {
        RegressorConfig::new(10)
            .with_hidden_sizes(&[6, 4])
            .with_dropout(0.2)
            .with_seed(42)
    }

    #[test]
    fn test_config_validation() {
        assert!(RegressorConfig::new(0).validate().is_err());
        assert!(RegressorConfig::new(10)
            .with_hidden_sizes(&[])
            .validate()
            .is_err());
        assert!(RegressorConfig::new(10)
            .with_hidden_sizes(&[8, 0])
            .validate()
            .is_err());
        assert!(RegressorConfig::new(10).with_dropout(1.0).validate().is_err());
        assert!(small_config().validate().is_ok());
    }

    #[test]
    fn test_default_architecture() {
        let config = RegressorConfig::new(60);
        assert_eq!(config.hidden_sizes, vec![50, 50, 50]);
        assert!((config.dropout - 0.2).abs() < 1e-6);
        assert_eq!(config.input_dim, 1);
    }

    #[test]
    fn test_regressor_forward_shape() {
        let model = small_config().build().unwrap();
        let input = Tensor::randn(&[5, 10, 1], 0.0, 1.0, 3);

        let output = model.forward(&input).unwrap();
        assert_eq!(output.shape(), &[5, 1]);
    }

    #[test]
    fn test_regressor_predict_one() {
        let model = small_config().build().unwrap();

        let window = vec![0.5; 10];
        let prediction = model.predict_one(&window).unwrap();
        assert!(prediction.is_finite());

        assert!(model.predict_one(&[0.5; 9]).is_err());
    }

    #[test]
    fn test_regressor_same_seed_same_weights() {
        let a = small_config().build().unwrap();
        let b = small_config().build().unwrap();
        let c = small_config().with_seed(7).build().unwrap();

        for (pa, pb) in a.parameters().iter().zip(b.parameters()) {
            assert_eq!(pa.data(), pb.data());
        }
        let differs = a
            .parameters()
            .iter()
            .zip(c.parameters())
            .any(|(pa, pc)| pa.data() != pc.data());
        assert!(differs);
    }

    #[test]
    fn test_regressor_backward_produces_all_gradients() {
        let mut model = small_config().build().unwrap();
        let input = Tensor::randn(&[4, 10, 1], 0.0, 1.0, 3);

        let output = model.forward_train(&input).unwrap();
        let grad = Tensor::ones(output.shape());
        let dx = model.backward(&grad).unwrap();

        assert_eq!(dx.shape(), input.shape());
        // 12 tensors per recurrent layer plus the output projection pair.
        assert_eq!(model.gradients().len(), 12 * 2 + 2);
        assert_eq!(model.gradients().len(), model.parameters().len());
    }

    #[test]
    fn test_export_import_round_trip() {
        let model = small_config().build().unwrap();
        let weights = model.export_weights();

        let mut other = small_config().with_seed(999).build().unwrap();
        other.import_weights(&weights).unwrap();

        let window = vec![0.3; 10];
        let a = model.predict_one(&window).unwrap();
        let b = other.predict_one(&window).unwrap();
        assert!((a - b).abs() < 1e-7);
    }

    #[test]
    fn test_import_rejects_missing_blob() {
        let model = small_config().build().unwrap();
        let mut weights = model.export_weights();
        weights.remove("output.bias");

        let mut other = small_config().build().unwrap();
        assert!(matches!(
            other.import_weights(&weights),
            Err(LayerError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut model = small_config().build().unwrap();
        let window = vec![0.7; 10];
        let before = model.predict_one(&window).unwrap();

        let snapshot = model.snapshot();
        for param in model.parameters_mut() {
            for v in param.data_mut() {
                *v += 0.5;
            }
        }
        let perturbed = model.predict_one(&window).unwrap();
        assert!((before - perturbed).abs() > 1e-6);

        model.restore(&snapshot).unwrap();
        let after = model.predict_one(&window).unwrap();
        assert!((before - after).abs() < 1e-7);
    }
}
