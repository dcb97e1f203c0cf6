//! HTTP surface for the prediction service
//!
//! Endpoints:
//!
//! - `GET  /` - HTML form with the nine numeric inputs and a Predict control
//! - `POST /predict` - form submission, renders the result page
//! - `POST /v1/predict` - JSON prediction API
//! - `GET  /health` - health check
//! - `GET  /metrics` - Prometheus-formatted metrics
//!
//! ## Example
//!
//! ```rust,ignore
//! use predecir::api::{create_router, AppState};
//! use predecir::resolve::{ArtifactBundle, ArtifactPaths};
//!
//! let predictor = ArtifactBundle::load(&ArtifactPaths::default())?;
//! let app = create_router(AppState::new(predictor));
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};

use crate::error::PredecirError;
use crate::features::{FeatureInput, FIELDS};
use crate::metrics::MetricsCollector;
use crate::predictor::Predictor;

pub mod types;

pub use types::{ErrorResponse, HealthResponse, PredictResponse};

/// Application state shared across handlers.
///
/// Holds the process-lifetime artifact cache (the loaded predictor) as an
/// explicitly injected object. It is read-only after construction, so
/// concurrent sessions share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// Loaded scaler/model pair
    predictor: Arc<Predictor>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Wrap a loaded predictor for serving.
    #[must_use]
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Access the metrics collector (used by tests and the CLI banner).
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Build the router with all routes registered.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/predict", post(form_predict_handler))
        .route("/v1/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Map a per-attempt error to an HTTP status.
///
/// Fatal errors (missing/unloadable artifacts) are handled before the server
/// starts, so handlers only ever see recoverable ones; anything else here is
/// a server-side bug and maps to 500.
fn error_status(err: &PredecirError) -> StatusCode {
    match err {
        PredecirError::ScalingError { .. }
        | PredecirError::PredictError { .. }
        | PredecirError::InvalidFeature { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Metrics handler - returns Prometheus-formatted metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// JSON prediction handler
async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<FeatureInput>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    let prediction = state.predictor.predict(&request).map_err(|e| {
        state.metrics.record_failure();
        (
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let elapsed = start.elapsed();
    state.metrics.record_success(elapsed);

    Ok(Json(PredictResponse {
        prediction: prediction.value,
        formatted: prediction.formatted(),
        raw: prediction.raw,
        latency_ms: elapsed.as_secs_f64() * 1000.0,
    }))
}

/// Serve the input form
async fn form_handler() -> Html<String> {
    Html(render_form_page(None))
}

/// Handle a form submission and render the result inline
async fn form_predict_handler(
    State(state): State<AppState>,
    Form(request): Form<FeatureInput>,
) -> Html<String> {
    let start = Instant::now();
    match state.predictor.predict(&request) {
        Ok(prediction) => {
            state.metrics.record_success(start.elapsed());
            let outcome = format!(
                r#"<div class="result ok"><strong>Predicted sales: {}</strong><br>Raw model output: {:?}</div>"#,
                prediction.formatted(),
                prediction.raw,
            );
            Html(render_form_page(Some(outcome)))
        },
        Err(e) => {
            state.metrics.record_failure();
            let outcome = format!(r#"<div class="result err">{e}</div>"#);
            Html(render_form_page(Some(outcome)))
        },
    }
}

/// Render the full form page, optionally with a result/error banner.
///
/// Every input is generated from the field table, so names, defaults and
/// widget bounds cannot drift from the vector assembly order.
fn render_form_page(outcome: Option<String>) -> String {
    let mut inputs = String::new();
    for spec in &FIELDS {
        let max_attr = spec
            .max
            .map(|m| format!(r#" max="{m}""#))
            .unwrap_or_default();
        inputs.push_str(&format!(
            r#"    <label for="{name}">{label}</label>
    <input type="number" id="{name}" name="{name}" value="{default}" min="{min}"{max_attr} step="{step}" required>
"#,
            name = spec.name,
            label = spec.label,
            default = spec.default,
            min = spec.min,
            step = spec.step,
        ));
    }

    let banner = outcome.unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sales Predictor</title>
  <style>
    body {{ font-family: sans-serif; max-width: 34rem; margin: 2rem auto; }}
    label {{ display: block; margin-top: 0.75rem; }}
    input {{ width: 100%; padding: 0.3rem; }}
    button {{ margin-top: 1rem; padding: 0.5rem 1.5rem; }}
    .result {{ margin-top: 1rem; padding: 0.75rem; border-radius: 4px; }}
    .ok {{ background: #e6f4e6; }}
    .err {{ background: #f8e1e1; }}
  </style>
</head>
<body>
  <h1>Sales Predictor</h1>
  <p>Enter the item and outlet features and click Predict.</p>
  <form method="post" action="/predict">
{inputs}    <button type="submit">Predict</button>
  </form>
  {banner}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{RegressorParams, ScalerParams};
    use crate::features::FEATURE_COUNT;
    use crate::predictor::{LinearRegressor, StandardScaler};

    fn test_state() -> AppState {
        let scaler = StandardScaler::from_params(ScalerParams {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        })
        .expect("valid params");
        let model = LinearRegressor::from_params(RegressorParams {
            coefficients: vec![1.0; FEATURE_COUNT],
            intercept: 0.0,
        });
        AppState::new(Predictor::new(Arc::new(scaler), Arc::new(model)))
    }

    #[test]
    fn test_create_router_builds() {
        let _router = create_router(test_state());
    }

    #[test]
    fn test_error_status_mapping() {
        let scaling = PredecirError::ScalingError {
            reason: String::new(),
        };
        assert_eq!(error_status(&scaling), StatusCode::UNPROCESSABLE_ENTITY);

        let predict = PredecirError::PredictError {
            reason: String::new(),
        };
        assert_eq!(error_status(&predict), StatusCode::UNPROCESSABLE_ENTITY);

        let io = PredecirError::IoError("disk".to_string());
        assert_eq!(error_status(&io), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_form_page_has_all_fields() {
        let page = render_form_page(None);
        for spec in &FIELDS {
            assert!(
                page.contains(&format!(r#"name="{}""#, spec.name)),
                "form missing input for {}",
                spec.name
            );
        }
        assert!(page.contains("Predict"));
    }

    #[test]
    fn test_form_page_year_bounds_rendered() {
        let page = render_form_page(None);
        assert!(page.contains(r#"min="1900""#));
        assert!(page.contains(r#"max="2100""#));
    }

    #[test]
    fn test_form_page_renders_outcome_banner() {
        let page = render_form_page(Some("<div class=\"result ok\">x</div>".to_string()));
        assert!(page.contains("result ok"));
    }

    #[tokio::test]
    async fn test_predict_handler_success() {
        let state = test_state();
        let input = FeatureInput::default();
        let response = predict_handler(State(state.clone()), Json(input))
            .await
            .expect("prediction should succeed");
        // Identity scaler + all-ones coefficients: sum of defaults
        let expected: f64 = input.to_vector().iter().sum();
        assert!((response.0.prediction - expected).abs() < 1e-9);
        assert_eq!(response.0.raw, vec![response.0.prediction]);
        assert_eq!(state.metrics().snapshot().successful_requests, 1);
    }

    #[tokio::test]
    async fn test_predict_handler_invalid_input_is_422() {
        let state = test_state();
        let input = FeatureInput {
            item_weight: -1.0,
            ..FeatureInput::default()
        };
        let (status, body) = predict_handler(State(state.clone()), Json(input))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.0.error.contains("item_weight"));
        assert_eq!(state.metrics().snapshot().failed_requests, 1);
    }

    #[tokio::test]
    async fn test_health_handler_reports_version() {
        let response = health_handler().await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.version, crate::VERSION);
    }
}
