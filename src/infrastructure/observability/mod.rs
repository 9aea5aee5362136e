//! Observability: Prometheus metrics

mod metrics;

pub use metrics::{
    init_metrics, record_api_key_event, record_auth_outcome, record_http_request,
    record_rate_limit_decision, record_rate_limiter_occupancy, PrometheusMetrics,
};
