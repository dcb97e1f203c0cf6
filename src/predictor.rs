//! Predict pipeline: assemble, transform, predict
//!
//! The scaler and model sit behind minimal capability traits so the pipeline
//! is a pure function of (inputs, injected artifacts) and test code can swap
//! in stubs returning fixed values. Both implementations are immutable after
//! construction and `Send + Sync`, so one loaded pair is shared read-only
//! across all sessions without locking.

use std::sync::Arc;

use crate::artifact::{RegressorParams, ScalerParams};
use crate::error::{PredecirError, Result};
use crate::features::{FeatureInput, FEATURE_COUNT};

/// Fitted transformation from a raw feature vector to a normalized one
pub trait Transform: Send + Sync {
    /// Apply the transform. Shape or value problems surface as
    /// [`PredecirError::ScalingError`].
    ///
    /// # Errors
    ///
    /// [`PredecirError::ScalingError`] on dimension mismatch.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Fitted regression from a normalized feature vector to a scalar
pub trait Predict: Send + Sync {
    /// Produce the predicted scalar. Shape or value problems surface as
    /// [`PredecirError::PredictError`].
    ///
    /// # Errors
    ///
    /// [`PredecirError::PredictError`] on dimension mismatch or a
    /// non-finite result.
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Standard scaler: per-feature centering and scaling.
///
/// Features whose fitted scale is (near) zero are centered but not divided,
/// the usual zero-variance guard.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Below this, a fitted scale is treated as zero variance
const SCALE_EPSILON: f64 = 1e-10;

impl StandardScaler {
    /// Build from fitted parameters.
    ///
    /// # Errors
    ///
    /// [`PredecirError::ScalingError`] if mean and scale lengths disagree.
    pub fn from_params(params: ScalerParams) -> Result<Self> {
        if params.mean.len() != params.scale.len() {
            return Err(PredecirError::ScalingError {
                reason: format!(
                    "scaler mean/scale length mismatch: {} vs {}",
                    params.mean.len(),
                    params.scale.len()
                ),
            });
        }
        Ok(Self {
            mean: params.mean,
            scale: params.scale,
        })
    }

    /// Number of features the scaler was fitted on
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

impl Transform for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.mean.len() {
            return Err(PredecirError::ScalingError {
                reason: format!(
                    "expected {} features, got {}",
                    self.mean.len(),
                    features.len()
                ),
            });
        }
        let scaled = features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                let centered = value - mean;
                if scale.abs() > SCALE_EPSILON {
                    centered / scale
                } else {
                    centered
                }
            })
            .collect();
        Ok(scaled)
    }
}

/// Linear regression: dot product of coefficients with the scaled vector,
/// plus intercept.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    /// Build from fitted parameters.
    #[must_use]
    pub fn from_params(params: RegressorParams) -> Self {
        Self {
            coefficients: params.coefficients,
            intercept: params.intercept,
        }
    }

    /// Number of features the model was fitted on
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

impl Predict for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(PredecirError::PredictError {
                reason: format!(
                    "expected {} features, got {}",
                    self.coefficients.len(),
                    features.len()
                ),
            });
        }
        let value = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(c, x)| c * x)
            .sum::<f64>()
            + self.intercept;

        // Jidoka gate: a non-finite prediction never reaches the user
        if !value.is_finite() {
            return Err(PredecirError::PredictError {
                reason: format!("model produced a non-finite value: {value}"),
            });
        }
        Ok(value)
    }
}

/// Result of one successful prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted scalar
    pub value: f64,
    /// The normalized vector fed to the model
    pub scaled: Vec<f64>,
    /// The unformatted model output, as a single-row vector
    pub raw: Vec<f64>,
}

/// Decimal places used for the user-facing rendering of the scalar
pub const DISPLAY_DECIMALS: usize = 4;

impl Prediction {
    /// User-facing rendering of the scalar with fixed decimal places
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{:.*}", DISPLAY_DECIMALS, self.value)
    }
}

/// The loaded scaler/model pair, injected wherever predictions are made.
///
/// Construction happens once at startup (see `resolve::ArtifactBundle`);
/// afterwards the predictor is immutable and shared via `Arc`.
#[derive(Clone)]
pub struct Predictor {
    scaler: Arc<dyn Transform>,
    model: Arc<dyn Predict>,
}

impl Predictor {
    /// Pair an already-loaded scaler and model.
    #[must_use]
    pub fn new(scaler: Arc<dyn Transform>, model: Arc<dyn Predict>) -> Self {
        Self { scaler, model }
    }

    /// Run one prediction: assemble the fixed-order vector, transform it,
    /// predict, and return the scalar with the raw output alongside.
    ///
    /// Failures abort this attempt only; the cached artifacts are untouched
    /// and the next call starts fresh.
    ///
    /// # Errors
    ///
    /// [`PredecirError::InvalidFeature`] for out-of-bounds inputs,
    /// [`PredecirError::ScalingError`] or [`PredecirError::PredictError`]
    /// from the artifact calls.
    pub fn predict(&self, input: &FeatureInput) -> Result<Prediction> {
        input.validate()?;
        let vector = input.to_vector();
        debug_assert_eq!(vector.len(), FEATURE_COUNT);

        let scaled = self.scaler.transform(&vector)?;
        let value = self.model.predict(&scaled)?;

        Ok(Prediction {
            value,
            scaled,
            raw: vec![value],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity scaler for deterministic pipeline tests
    struct IdentityTransform;

    impl Transform for IdentityTransform {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
            Ok(features.to_vec())
        }
    }

    /// Stub model returning a fixed value regardless of input
    struct FixedPredict(f64);

    impl Predict for FixedPredict {
        fn predict(&self, _features: &[f64]) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler::from_params(ScalerParams {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        })
        .expect("valid params")
    }

    #[test]
    fn test_scaler_centers_and_scales() {
        let scaler = StandardScaler::from_params(ScalerParams {
            mean: vec![1.0, 2.0],
            scale: vec![2.0, 4.0],
        })
        .expect("valid params");
        let out = scaler.transform(&[3.0, 10.0]).expect("transform");
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn test_scaler_zero_variance_guard() {
        let scaler = StandardScaler::from_params(ScalerParams {
            mean: vec![5.0],
            scale: vec![0.0],
        })
        .expect("valid params");
        // Centered but not divided
        let out = scaler.transform(&[8.0]).expect("transform");
        assert_eq!(out, vec![3.0]);
    }

    #[test]
    fn test_scaler_shape_mismatch_is_scaling_error() {
        let scaler = identity_scaler();
        let err = scaler.transform(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PredecirError::ScalingError { .. }));
        assert!(err.to_string().contains("expected 9 features, got 3"));
    }

    #[test]
    fn test_scaler_rejects_mismatched_params() {
        let result = StandardScaler::from_params(ScalerParams {
            mean: vec![0.0; 9],
            scale: vec![1.0; 3],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_regressor_dot_product() {
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![1.0, 2.0, 3.0],
            intercept: 0.5,
        });
        let value = model.predict(&[1.0, 1.0, 1.0]).expect("predict");
        assert!((value - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_regressor_shape_mismatch_is_predict_error() {
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![1.0; 9],
            intercept: 0.0,
        });
        let err = model.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, PredecirError::PredictError { .. }));
    }

    #[test]
    fn test_regressor_non_finite_gated() {
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![f64::MAX, f64::MAX],
            intercept: 0.0,
        });
        let err = model.predict(&[f64::MAX, f64::MAX]).unwrap_err();
        assert!(matches!(err, PredecirError::PredictError { .. }));
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_pipeline_with_stub_artifacts() {
        let predictor = Predictor::new(Arc::new(IdentityTransform), Arc::new(FixedPredict(42.0)));
        let prediction = predictor
            .predict(&FeatureInput::default())
            .expect("predict");
        assert!((prediction.value - 42.0).abs() < f64::EPSILON);
        assert_eq!(prediction.raw, vec![42.0]);
        assert_eq!(prediction.scaled, FeatureInput::default().to_vector());
    }

    #[test]
    fn test_pipeline_scenario_vector_is_finite() {
        // Scenario: [10.0, 0.0, 0.05, 1.0, 100.0, 1999, 1.0, 1.0, 1.0]
        let scaler = identity_scaler();
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![0.1; FEATURE_COUNT],
            intercept: 1.0,
        });
        let predictor = Predictor::new(Arc::new(scaler), Arc::new(model));
        let input =
            FeatureInput::from_vector([10.0, 0.0, 0.05, 1.0, 100.0, 1999.0, 1.0, 1.0, 1.0]);
        let prediction = predictor.predict(&input).expect("predict");
        assert!(prediction.value.is_finite());
    }

    #[test]
    fn test_pipeline_idempotent() {
        let scaler = identity_scaler();
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![0.25; FEATURE_COUNT],
            intercept: -2.0,
        });
        let predictor = Predictor::new(Arc::new(scaler), Arc::new(model));
        let input = FeatureInput::default();
        let a = predictor.predict(&input).expect("first");
        let b = predictor.predict(&input).expect("second");
        assert_eq!(a, b, "identical inputs must produce identical output");
    }

    #[test]
    fn test_pipeline_rejects_invalid_input() {
        let predictor = Predictor::new(Arc::new(IdentityTransform), Arc::new(FixedPredict(0.0)));
        let input = FeatureInput {
            item_weight: -5.0,
            ..FeatureInput::default()
        };
        let err = predictor.predict(&input).unwrap_err();
        assert!(matches!(err, PredecirError::InvalidFeature { .. }));
    }

    #[test]
    fn test_pipeline_recovers_after_scaling_error() {
        // A 3-feature scaler against 9 inputs fails, but the predictor
        // stays usable with a subsequent valid call path untouched.
        let bad_scaler = StandardScaler::from_params(ScalerParams {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        })
        .expect("valid params");
        let predictor = Predictor::new(Arc::new(bad_scaler), Arc::new(FixedPredict(1.0)));
        let input = FeatureInput::default();
        assert!(predictor.predict(&input).is_err());
        // Same error again, not a panic or poisoned state
        assert!(predictor.predict(&input).is_err());
    }

    #[test]
    fn test_formatted_fixed_decimals() {
        let prediction = Prediction {
            value: 1234.56789,
            scaled: vec![],
            raw: vec![1234.56789],
        };
        assert_eq!(prediction.formatted(), "1234.5679");

        let negative = Prediction {
            value: -0.5,
            scaled: vec![],
            raw: vec![-0.5],
        };
        assert_eq!(negative.formatted(), "-0.5000");
    }
}
