//! Artifact types: what a training run persists.

use crate::Result;
use serde::{Deserialize, Serialize};
use sibyl_data::{MinMaxScaler, ScalerState};
use sibyl_layers::{RegressorConfig, SequenceRegressor};
use std::collections::HashMap;

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// The persisted model: architecture metadata plus named weight blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact format version.
    pub version: u32,
    /// Symbol this model was trained for.
    pub symbol: String,
    /// Architecture metadata needed to rebuild the network.
    pub config: RegressorConfig,
    /// Flattened parameter tensors, keyed by parameter name.
    pub weights: HashMap<String, Vec<f32>>,
    /// Epoch whose weights this artifact carries.
    pub best_epoch: usize,
    /// Validation loss at that epoch.
    pub best_val_loss: f64,
}

impl ModelArtifact {
    /// Captures a trained model into an artifact.
    pub fn from_model(
        symbol: impl Into<String>,
        model: &SequenceRegressor,
        best_epoch: usize,
        best_val_loss: f64,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            symbol: symbol.into(),
            config: model.config().clone(),
            weights: model.export_weights(),
            best_epoch,
            best_val_loss,
        }
    }

    /// Rebuilds the model from the stored architecture and weights.
    ///
    /// # Errors
    ///
    /// Fails if the stored config is invalid or the weight blobs do not
    /// match the architecture.
    pub fn build_model(&self) -> Result<SequenceRegressor> {
        let mut model = SequenceRegressor::from_config(self.config.clone())?;
        model.import_weights(&self.weights)?;
        Ok(model)
    }
}

/// The persisted scaler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    /// Symbol this scaler was fit for.
    pub symbol: String,
    /// The fitted `{min, max}` pair.
    pub state: ScalerState,
}

impl ScalerArtifact {
    /// Creates a scaler artifact.
    pub fn new(symbol: impl Into<String>, state: ScalerState) -> Self {
        Self {
            symbol: symbol.into(),
            state,
        }
    }

    /// Rebuilds a ready-to-use scaler.
    pub fn build_scaler(&self) -> MinMaxScaler {
        MinMaxScaler::from_state(self.state)
    }
}

/// The model/scaler pair produced by one training run.
///
/// The two halves are only meaningful together: inference with a
/// mismatched scaler silently produces wrong prices, so stores must save
/// and load them as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    /// The model blob.
    pub model: ModelArtifact,
    /// The scaler blob.
    pub scaler: ScalerArtifact,
}

impl TrainedArtifact {
    /// Bundles a model and scaler trained together.
    pub fn new(model: ModelArtifact, scaler: ScalerArtifact) -> Self {
        Self { model, scaler }
    }

    /// The symbol this artifact belongs to.
    pub fn symbol(&self) -> &str {
        &self.model.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_layers::Layer;

    fn small_model() -> SequenceRegressor {
        RegressorConfig::new(10)
            .with_hidden_sizes(&[6, 4])
            .with_seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_model_artifact_round_trip() {
        let model = small_model();
        let artifact = ModelArtifact::from_model("AAPL", &model, 3, 0.0125);

        assert_eq!(artifact.version, FORMAT_VERSION);
        assert_eq!(artifact.symbol, "AAPL");
        assert_eq!(artifact.weights.len(), model.parameters().len());

        let rebuilt = artifact.build_model().unwrap();
        let window = vec![0.4; 10];
        let a = model.predict_one(&window).unwrap();
        let b = rebuilt.predict_one(&window).unwrap();
        assert!((a - b).abs() < 1e-7);
    }

    #[test]
    fn test_model_artifact_json_round_trip() {
        let artifact = ModelArtifact::from_model("MSFT", &small_model(), 0, 0.5);

        let json = serde_json::to_string(&artifact).unwrap();
        let restored: ModelArtifact = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.symbol, "MSFT");
        assert_eq!(restored.config, artifact.config);
        let model = restored.build_model().unwrap();
        assert_eq!(model.lookback(), 10);
    }

    #[test]
    fn test_corrupt_weights_rejected() {
        let mut artifact = ModelArtifact::from_model("AAPL", &small_model(), 0, 0.5);
        artifact
            .weights
            .insert("output.bias".to_string(), vec![0.0; 99]);

        assert!(artifact.build_model().is_err());
    }

    #[test]
    fn test_scaler_artifact() {
        let artifact = ScalerArtifact::new("AAPL", ScalerState { min: 10.0, max: 20.0 });
        let scaler = artifact.build_scaler();
        assert_eq!(scaler.transform(15.0).unwrap(), 0.5);
    }
}
