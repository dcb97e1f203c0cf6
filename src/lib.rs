//! # Predecir
//!
//! Predecir (Spanish: "to predict") is a thin serving layer over a
//! pre-fitted feature scaler and regression model. It collects nine numeric
//! features, resolves and loads the two artifacts from disk once per
//! process, and exposes single-shot synchronous predictions behind an HTML
//! form, a JSON API and a CLI.
//!
//! The predictive logic lives entirely inside the externally-trained
//! artifacts; this crate only assembles the fixed-order feature vector,
//! applies the cached scaler's transform and the cached model's predict,
//! and displays the scalar result.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use predecir::artifact::{RegressorParams, ScalerParams};
//! use predecir::features::FeatureInput;
//! use predecir::predictor::{LinearRegressor, Predictor, StandardScaler};
//!
//! let scaler = StandardScaler::from_params(ScalerParams {
//!     mean: vec![0.0; 9],
//!     scale: vec![1.0; 9],
//! }).unwrap();
//! let model = LinearRegressor::from_params(RegressorParams {
//!     coefficients: vec![0.1; 9],
//!     intercept: 1.0,
//! });
//!
//! let predictor = Predictor::new(Arc::new(scaler), Arc::new(model));
//! let prediction = predictor.predict(&FeatureInput::default()).unwrap();
//! assert!(prediction.value.is_finite());
//! ```
//!
//! ## Modules
//!
//! - [`features`]: the nine-field input collector and vector assembly
//! - [`artifact`]: the `.prd` container format for the two artifacts
//! - [`resolve`]: primary/fallback path resolution and one-time loading
//! - [`predictor`]: the transform/predict pipeline behind capability traits
//! - [`api`]: axum HTTP surface (form, JSON API, health, metrics)
//! - [`metrics`]: prediction counters in Prometheus format
//! - [`error`]: the error taxonomy

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod artifact;
pub mod error;
pub mod features;
pub mod metrics;
pub mod predictor;
pub mod resolve;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
