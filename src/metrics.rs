//! Prediction metrics for production monitoring
//!
//! Tracks request counts, error rate and predict latency, exposed in
//! Prometheus format at `/metrics`. Counters are atomics shared behind
//! `Arc`, so the collector is cheap to clone into handlers.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector for the predict surface
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of predict requests
    total_requests: Arc<AtomicUsize>,
    /// Requests that produced a prediction
    successful_requests: Arc<AtomicUsize>,
    /// Requests aborted by a scaling or predict error
    failed_requests: Arc<AtomicUsize>,
    /// Cumulative predict pipeline time in microseconds
    total_predict_time_us: Arc<AtomicU64>,
    /// Start time for uptime and rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new collector with zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_predict_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction and its pipeline latency
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_predict_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a rejected predict attempt
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Current snapshot of all metrics
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_time_us = self.total_predict_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            uptime_secs: uptime.as_secs(),
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Export metrics in Prometheus text format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP predecir_requests_total Total number of predict requests\n\
             # TYPE predecir_requests_total counter\n\
             predecir_requests_total {}\n\
             # HELP predecir_requests_successful Successful predictions\n\
             # TYPE predecir_requests_successful counter\n\
             predecir_requests_successful {}\n\
             # HELP predecir_requests_failed Rejected predict attempts\n\
             # TYPE predecir_requests_failed counter\n\
             predecir_requests_failed {}\n\
             # HELP predecir_avg_latency_ms Average predict latency in milliseconds\n\
             # TYPE predecir_avg_latency_ms gauge\n\
             predecir_avg_latency_ms {:.3}\n\
             # HELP predecir_error_rate Fraction of requests that failed\n\
             # TYPE predecir_error_rate gauge\n\
             predecir_error_rate {:.4}\n\
             # HELP predecir_uptime_seconds Server uptime in seconds\n\
             # TYPE predecir_uptime_seconds counter\n\
             predecir_uptime_seconds {}\n",
            snapshot.total_requests,
            snapshot.successful_requests,
            snapshot.failed_requests,
            snapshot.avg_latency_ms,
            snapshot.error_rate,
            snapshot.uptime_secs,
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the collector
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Total predict requests seen
    pub total_requests: usize,
    /// Requests that produced a prediction
    pub successful_requests: usize,
    /// Requests aborted by an error
    pub failed_requests: usize,
    /// Seconds since the collector was created
    pub uptime_secs: u64,
    /// Mean pipeline latency over successful requests, in milliseconds
    pub avg_latency_ms: f64,
    /// failed / total, 0.0 when no requests yet
    pub error_rate: f64,
}
