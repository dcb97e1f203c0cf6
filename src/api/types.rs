//! API request/response types
//!
//! One serde struct per wire message. The predict request body is
//! [`crate::features::FeatureInput`] itself, so the JSON field names, the
//! form field names and the CLI flags all come from the same table.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Successful prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// The predicted scalar
    pub prediction: f64,
    /// The scalar rendered with fixed decimal places
    pub formatted: String,
    /// Unformatted model output (single-row vector), for transparency
    pub raw: Vec<f64>,
    /// Pipeline latency in milliseconds
    pub latency_ms: f64,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-visible error message
    pub error: String,
}
