//! Prometheus metrics for the gateway

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Prometheus metrics handle for serving the metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Render metrics in the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
///
/// Returns `None` when disabled or when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record an authentication outcome: a pipeline result (`admitted` or an error kind) or a login/refresh event
pub fn record_auth_outcome(outcome: &str, credential: &str) {
    counter!(
        "gateway_auth_requests_total",
        "outcome" => outcome.to_string(),
        "credential" => credential.to_string()
    )
    .increment(1);
}

/// Record a rate-limit decision for a tier
pub fn record_rate_limit_decision(tier: &str, decision: &str) {
    counter!(
        "gateway_rate_limit_decisions_total",
        "tier" => tier.to_string(),
        "decision" => decision.to_string()
    )
    .increment(1);
}

/// Record an API key lifecycle event (`created`, `revoked`)
pub fn record_api_key_event(event: &str) {
    counter!("gateway_api_key_events_total", "event" => event.to_string()).increment(1);
}

/// Publish limiter occupancy
pub fn record_rate_limiter_occupancy(total_identifiers: usize, blocked_identifiers: usize) {
    gauge!("gateway_rate_limit_identifiers").set(total_identifiers as f64);
    gauge!("gateway_rate_limit_blocked_identifiers").set(blocked_identifiers as f64);
}
