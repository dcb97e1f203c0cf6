//! Artifact resolution and one-time loading
//!
//! Each required artifact is located through a primary/fallback path pair:
//! a path is usable when it exists and is non-empty, the primary wins when
//! both are usable, and a miss is reported against the primary path (the
//! place an operator is expected to install the file).
//!
//! Loading happens exactly once per process. The loaded pair is handed to
//! the caller as a [`Predictor`] which it owns and injects into the serving
//! state; there is no hidden global cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::{decode_regressor, decode_scaler};
use crate::error::{ArtifactRole, PredecirError, Result};
use crate::predictor::{LinearRegressor, Predictor, StandardScaler};

/// Default primary path for the scaler artifact
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.prd";

/// Default primary path for the regressor artifact
pub const DEFAULT_MODEL_PATH: &str = "models/regressor.prd";

/// Default fallback path for the scaler artifact
pub const DEFAULT_SCALER_FALLBACK: &str = "/var/lib/predecir/models/scaler.prd";

/// Default fallback path for the regressor artifact
pub const DEFAULT_MODEL_FALLBACK: &str = "/var/lib/predecir/models/regressor.prd";

/// A path is usable when it exists and has non-zero size.
#[must_use]
pub fn is_usable(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Primary/fallback path pair for one artifact
#[derive(Debug, Clone)]
pub struct ArtifactSource {
    /// Which artifact this pair locates
    pub role: ArtifactRole,
    /// Preferred location
    pub primary: PathBuf,
    /// Location tried when the primary is missing or empty
    pub fallback: PathBuf,
}

impl ArtifactSource {
    /// Build a source for `role`.
    pub fn new(
        role: ArtifactRole,
        primary: impl Into<PathBuf>,
        fallback: impl Into<PathBuf>,
    ) -> Self {
        Self {
            role,
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Select the first usable path: primary, then fallback.
    ///
    /// # Errors
    ///
    /// [`PredecirError::MissingArtifact`] naming the primary path when
    /// neither location is usable.
    pub fn resolve(&self) -> Result<PathBuf> {
        if is_usable(&self.primary) {
            return Ok(self.primary.clone());
        }
        if is_usable(&self.fallback) {
            return Ok(self.fallback.clone());
        }
        Err(PredecirError::MissingArtifact {
            role: self.role,
            primary: self.primary.clone(),
        })
    }
}

/// The full path configuration: one source per required artifact
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Scaler location pair
    pub scaler: ArtifactSource,
    /// Model location pair
    pub model: ArtifactSource,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            scaler: ArtifactSource::new(
                ArtifactRole::Scaler,
                DEFAULT_SCALER_PATH,
                DEFAULT_SCALER_FALLBACK,
            ),
            model: ArtifactSource::new(
                ArtifactRole::Model,
                DEFAULT_MODEL_PATH,
                DEFAULT_MODEL_FALLBACK,
            ),
        }
    }
}

impl ArtifactPaths {
    /// Resolve both artifacts independently.
    ///
    /// # Errors
    ///
    /// Returns *every* missing-artifact error, so the caller can surface all
    /// missing paths in one report before halting.
    pub fn resolve_both(&self) -> std::result::Result<(PathBuf, PathBuf), Vec<PredecirError>> {
        let mut errors = Vec::new();
        let scaler = self.scaler.resolve().map_err(|e| errors.push(e)).ok();
        let model = self.model.resolve().map_err(|e| errors.push(e)).ok();
        match (scaler, model) {
            (Some(s), Some(m)) => Ok((s, m)),
            _ => Err(errors),
        }
    }
}

/// One-time loader for the scaler/model pair.
pub struct ArtifactBundle;

impl ArtifactBundle {
    /// Resolve both paths, read and decode both artifacts, and build the
    /// process-lifetime [`Predictor`].
    ///
    /// # Errors
    ///
    /// All missing-artifact errors at once when resolution fails, or a
    /// single load failure (read or decode) for the first artifact that
    /// cannot be loaded. Either way the predict flow must not be entered.
    pub fn load(paths: &ArtifactPaths) -> std::result::Result<Predictor, Vec<PredecirError>> {
        let (scaler_path, model_path) = paths.resolve_both()?;

        let scaler = Self::load_scaler(&scaler_path).map_err(|e| vec![e])?;
        let model = Self::load_regressor(&model_path).map_err(|e| vec![e])?;

        Ok(Predictor::new(Arc::new(scaler), Arc::new(model)))
    }

    fn load_scaler(path: &Path) -> Result<StandardScaler> {
        let data = std::fs::read(path).map_err(|e| PredecirError::LoadFailure {
            role: ArtifactRole::Scaler,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let params = decode_scaler(&data, path)?;
        StandardScaler::from_params(params).map_err(|e| PredecirError::LoadFailure {
            role: ArtifactRole::Scaler,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn load_regressor(path: &Path) -> Result<LinearRegressor> {
        let data = std::fs::read(path).map_err(|e| PredecirError::LoadFailure {
            role: ArtifactRole::Model,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let params = decode_regressor(&data, path)?;
        Ok(LinearRegressor::from_params(params))
    }
}
