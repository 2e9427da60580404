//! Trainer configuration.

use crate::error::{Result, TrainingError};
use serde::{Deserialize, Serialize};

/// Configuration for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Lookback window length fed to the model.
    pub lookback: usize,
    /// Maximum number of epochs.
    pub epochs: usize,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Fraction of windows held out for validation.
    pub validation_fraction: f64,
    /// Epochs without validation improvement before stopping.
    /// Zero disables early stopping.
    pub patience: usize,
    /// Minimum validation-loss improvement that resets patience.
    pub min_delta: f64,
    /// Learning rate for the Adam optimizer.
    pub learning_rate: f32,
    /// Hidden size of each stacked recurrent layer.
    pub hidden_sizes: Vec<usize>,
    /// Dropout rate between recurrent layers.
    pub dropout: f32,
    /// Seed driving the split, weight init, and dropout masks.
    pub seed: u64,
    /// Minimum number of observations required to train at all. Small
    /// series make the validation signal unreliable.
    pub min_observations: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            epochs: 100,
            batch_size: 32,
            validation_fraction: 0.2,
            patience: 10,
            min_delta: 0.0,
            learning_rate: 0.001,
            hidden_sizes: vec![50, 50, 50],
            dropout: 0.2,
            seed: 42,
            min_observations: 100,
        }
    }
}

impl TrainerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] when any dimension is
    /// degenerate or the split fractions cannot yield non-empty train and
    /// validation sets.
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(TrainingError::InvalidConfig(
                "lookback must be positive".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig(
                "epochs must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "batch_size must be positive".to_string(),
            ));
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "validation_fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        if self.min_observations < self.lookback + 2 {
            // Need at least two windows so both split halves are non-empty.
            return Err(TrainingError::InvalidConfig(format!(
                "min_observations ({}) must be at least lookback + 2 ({})",
                self.min_observations,
                self.lookback + 2
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lookback, 60);
        assert_eq!(config.epochs, 100);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.patience, 10);
        assert_eq!(config.min_observations, 100);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut config = TrainerConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.validation_fraction = 1.0;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.min_observations = 61; // lookback + 1: only one window
        assert!(config.validate().is_err());
    }
}
