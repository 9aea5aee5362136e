use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;

/// Build the full router
///
/// The Prometheus route is mounted at `metrics_path` only when the state carries a
/// metrics handle.
pub fn create_router(state: AppState, metrics_path: &str) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .nest("/api/v1", v1::create_v1_router(state.clone()));

    if let Some(metrics) = state.metrics.clone() {
        router = router.route(
            metrics_path,
            get(move || {
                let metrics = metrics.clone();
                async move { metrics.render() }
            }),
        );
    }

    router
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
