//! Error types for predecir
//!
//! The taxonomy follows the four user-visible failure modes of the predict
//! pipeline: missing artifact and load failure are fatal to the session,
//! scaling and predict errors abort a single attempt and leave the cached
//! artifacts untouched.

use std::path::PathBuf;

use thiserror::Error;

/// Which of the two required artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    /// The fitted feature scaler
    Scaler,
    /// The fitted regression model
    Model,
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scaler => write!(f, "scaler"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// Error type for all predecir operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredecirError {
    /// Neither the primary nor the fallback path for an artifact is usable.
    /// Fatal: the predict flow must not be entered. The message names the
    /// primary path, which is where an operator is expected to install the
    /// artifact.
    #[error("{role} not found at: {}", primary.display())]
    MissingArtifact {
        /// Artifact the resolver could not locate
        role: ArtifactRole,
        /// Expected primary path
        primary: PathBuf,
    },

    /// A path resolved but the artifact could not be deserialized. Fatal.
    #[error("failed to load {role} from {}: {reason}", path.display())]
    LoadFailure {
        /// Artifact that failed to load
        role: ArtifactRole,
        /// Path that was read
        path: PathBuf,
        /// Underlying cause (truncated header, bad magic, checksum mismatch, ...)
        reason: String,
    },

    /// The scaler rejected the assembled feature vector. Recoverable: the
    /// current attempt is aborted, the session stays usable.
    #[error("error while scaling input: {reason}")]
    ScalingError {
        /// Cause reported by the transform
        reason: String,
    },

    /// The model rejected the scaled vector or produced a non-finite value.
    /// Recoverable, like [`PredecirError::ScalingError`].
    #[error("error while predicting: {reason}")]
    PredictError {
        /// Cause reported by the predict call
        reason: String,
    },

    /// An input field is out of its declared bounds or non-finite
    #[error("invalid value for {field}: {reason}")]
    InvalidFeature {
        /// Field name from the feature table
        field: &'static str,
        /// What was wrong with the value
        reason: String,
    },

    /// Bad CLI or server configuration (unparseable address, bad bind, ...)
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration problem
        reason: String,
    },

    /// Filesystem error outside artifact decoding
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, PredecirError>;

impl PredecirError {
    /// Whether the error ends the session (missing or unloadable artifacts)
    /// as opposed to aborting a single predict attempt.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact { .. } | Self::LoadFailure { .. }
        )
    }
}
