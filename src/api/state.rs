//! Application state shared by every handler

use std::sync::Arc;

use crate::config::RateLimitsConfig;
use crate::domain::principal::PrincipalStore;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::auth::{PasswordHasher, TokenIssuer};
use crate::infrastructure::gateway::AuthPipeline;
use crate::infrastructure::observability::PrometheusMetrics;
use crate::infrastructure::rate_limit::RateLimiter;

/// Long-lived services, built once at start-up and cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<ApiKeyService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub principal_store: Arc<dyn PrincipalStore>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub pipeline: Arc<AuthPipeline>,
    pub rate_limits: Arc<RateLimitsConfig>,
    pub metrics: Option<PrometheusMetrics>,
}

impl AppState {
    /// Attach the Prometheus handle served on the metrics route
    pub fn with_metrics(mut self, metrics: Option<PrometheusMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_key_service", &self.api_key_service)
            .field("pipeline", &self.pipeline)
            .field("metrics_enabled", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
