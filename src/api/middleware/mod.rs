//! HTTP middleware

pub mod auth;
pub mod logging;
pub mod metrics;

use axum::extract::{MatchedPath, Request};

pub use auth::{authenticate, extract_credentials, require_rate_limit_admin, Authenticated};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;

/// Route template when matched, to keep label cardinality bounded
pub(crate) fn matched_path(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
