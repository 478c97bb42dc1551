//! Prometheus metrics for request and storage latency.
//!
//! This module provides metrics for:
//! - HTTP requests by method and status
//! - HTTP request latency
//! - Storage operation latency
//! - Storage failures

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Storage operation latency metric name.
pub const METRIC_STORAGE_LATENCY: &str = "storage_operation_latency_ms";
/// Storage failures counter metric name.
pub const METRIC_STORAGE_ERRORS: &str = "storage_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORAGE_LATENCY,
        "Storage operation latency in milliseconds"
    );
    describe_counter!(
        METRIC_STORAGE_ERRORS,
        "Total number of storage operations that failed"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// How often histogram buckets are drained between scrapes.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Periodically run recorder upkeep so unscraped histograms stay bounded.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Record one served HTTP request.
pub fn record_http_request(method: &str, status: u16, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "method" => method.to_string()).record(latency_ms);
}

/// Increment storage failures counter.
pub fn inc_storage_errors(operation: &'static str) {
    counter!(METRIC_STORAGE_ERRORS, "operation" => operation).increment(1);
}

/// Middleware recording count and latency of every request.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_http_request(method.as_str(), response.status().as_u16(), start);
    response
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    operation: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and operation label.
    pub fn new(metric_name: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            operation,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        histogram!(self.metric_name, "operation" => self.operation).record(latency_ms);
    }
}

/// Create a latency timer for a storage operation.
pub fn timer_storage(operation: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_STORAGE_LATENCY, operation)
}
