//! Versioned gateway API

pub mod admin;
pub mod api_keys;
pub mod auth;
pub mod status;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::middleware::{authenticate, require_rate_limit_admin};
use crate::api::state::AppState;

/// Routes under `/api/v1`
///
/// Login and refresh are public. Everything else passes the admission pipeline first.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/status", get(status::status))
        .route(
            "/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/api-keys/revoke", post(api_keys::revoke_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin = Router::new()
        .route("/admin/rate-limits", get(admin::rate_limit_stats))
        .route_layer(middleware::from_fn_with_state(
            state,
            require_rate_limit_admin,
        ));

    public.merge(protected).merge(admin)
}
