//! # Prometheus Metrics
//!
//! Request counters recorded through the `metrics` facade and rendered by
//! `metrics-exporter-prometheus` at `/metrics`.
//!
//! The recorder is process-global and installed once by the binary. When no
//! recorder is installed (tests, embedding) the counters are no-ops and
//! `/metrics` answers 404.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Total requests, labelled by status class.
pub const REQUESTS_TOTAL: &str = "userdesk_http_requests_total";
/// Change-email commands accepted by the dispatcher.
pub const EMAIL_CHANGES_TOTAL: &str = "userdesk_email_changes_total";
/// Request latency in seconds.
pub const REQUEST_DURATION: &str = "userdesk_http_request_duration_seconds";

/// Install the global Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Record one finished request.
fn record(status: StatusCode, elapsed_secs: f64) {
    metrics::counter!(REQUESTS_TOTAL, "status_class" => status_class(status)).increment(1);
    metrics::histogram!(REQUEST_DURATION).record(elapsed_secs);
}

/// Middleware that counts requests by status class and records latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;
    record(response.status(), started.elapsed().as_secs_f64());
    response
}

/// GET /metrics — Prometheus text exposition.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
