//! Artifact persistence for Sibyl.
//!
//! A training run produces two blobs that are only meaningful together: the
//! model (architecture metadata plus weights) and the scaler parameters it
//! was trained against. This crate bundles them as a [`TrainedArtifact`]
//! and persists the pair atomically-by-convention behind the
//! [`ArtifactStore`] trait, keyed by symbol, so the core has no direct
//! dependency on any particular storage mechanism.
//!
//! # Example
//!
//! ```no_run
//! use sibyl_checkpoint::{ArtifactStore, FsArtifactStore};
//!
//! fn main() -> sibyl_checkpoint::Result<()> {
//!     let store = FsArtifactStore::new("/var/lib/sibyl/artifacts");
//!     let artifact = store.load("AAPL")?; // NotFound until trained
//!     let model = artifact.model.build_model()?;
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod store;

pub use artifact::{ModelArtifact, ScalerArtifact, TrainedArtifact};
pub use store::{ArtifactStore, FsArtifactStore};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during artifact persistence.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// I/O error during save or load.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No trained artifact exists for the symbol ("model not yet trained").
    #[error("No trained artifact found for symbol {symbol}")]
    NotFound {
        /// The requested symbol.
        symbol: String,
    },

    /// Error during serialization.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Error during deserialization.
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Artifact format version mismatch.
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },

    /// The stored weights do not fit the stored architecture.
    #[error("Invalid model artifact: {0}")]
    InvalidModel(#[from] sibyl_layers::LayerError),
}

/// Result type for artifact operations.
pub type Result<T> = std::result::Result<T, ArtifactError>;
