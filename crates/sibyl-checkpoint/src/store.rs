//! Artifact store trait and filesystem implementation.

use crate::artifact::{ModelArtifact, ScalerArtifact, TrainedArtifact, FORMAT_VERSION};
use crate::{ArtifactError, Result};
use std::path::{Path, PathBuf};

/// Persistence boundary for trained artifacts.
///
/// Implementations must treat the model and scaler blobs as a unit: a
/// symbol either has both or neither.
pub trait ArtifactStore: Send + Sync {
    /// Persists the artifact pair for its symbol, replacing any previous
    /// artifact.
    fn save(&self, artifact: &TrainedArtifact) -> Result<()>;

    /// Loads the artifact pair for a symbol.
    ///
    /// # Errors
    ///
    /// Fails with [`ArtifactError::NotFound`] when the symbol has no
    /// trained artifact ("model not yet trained").
    fn load(&self, symbol: &str) -> Result<TrainedArtifact>;

    /// Returns whether a complete artifact pair exists for the symbol.
    fn exists(&self, symbol: &str) -> bool;
}

/// Stores artifacts as two JSON files per symbol under one directory:
/// `<SYMBOL>_model.json` and `<SYMBOL>_scaler.json`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory this store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_model.json", symbol.to_uppercase()))
    }

    fn scaler_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_scaler.json", symbol.to_uppercase()))
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(ArtifactError::Serialization)?;
        std::fs::write(path, json).map_err(|e| ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let json = std::fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(ArtifactError::Deserialization)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn save(&self, artifact: &TrainedArtifact) -> Result<()> {
        let symbol = artifact.symbol();
        tracing::info!(symbol, dir = %self.dir.display(), "Saving trained artifact");

        std::fs::create_dir_all(&self.dir).map_err(|e| ArtifactError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        self.write_json(&self.model_path(symbol), &artifact.model)?;
        self.write_json(&self.scaler_path(symbol), &artifact.scaler)?;

        tracing::debug!(
            symbol,
            weights = artifact.model.weights.len(),
            "Artifact saved"
        );
        Ok(())
    }

    fn load(&self, symbol: &str) -> Result<TrainedArtifact> {
        let model_path = self.model_path(symbol);
        let scaler_path = self.scaler_path(symbol);

        // Both blobs or neither: a half-present pair counts as untrained.
        if !model_path.exists() || !scaler_path.exists() {
            return Err(ArtifactError::NotFound {
                symbol: symbol.to_string(),
            });
        }

        let model: ModelArtifact = self.read_json(&model_path)?;
        if model.version != FORMAT_VERSION {
            return Err(ArtifactError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: model.version,
            });
        }
        let scaler: ScalerArtifact = self.read_json(&scaler_path)?;

        tracing::info!(symbol, best_epoch = model.best_epoch, "Artifact loaded");
        Ok(TrainedArtifact::new(model, scaler))
    }

    fn exists(&self, symbol: &str) -> bool {
        self.model_path(symbol).exists() && self.scaler_path(symbol).exists()
    }
}
