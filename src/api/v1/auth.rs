//! Login, token refresh and caller identity

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::middleware::Authenticated;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::auth::CredentialKind;
use crate::domain::rate_limit::RateTier;
use crate::domain::{AuthError, IssuedToken, Role};
use crate::infrastructure::observability::record_auth_outcome;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// The authenticated principal, safe to expose
#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub permissions: Vec<String>,
    pub resource_scopes: Vec<String>,
    pub tier: RateTier,
    pub authenticated_with: CredentialKind,
}

/// POST /api/v1/auth/login
///
/// Not rate limited. Unknown users, inactive users and wrong passwords all get the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let principal = state
        .principal_store
        .find_by_username(request.username.trim())
        .await?
        .filter(|p| p.is_active())
        .filter(|p| state.password_hasher.verify_principal(p, &request.password));

    let Some(principal) = principal else {
        record_auth_outcome("login_failed", "password");
        debug!(username = %request.username, "Login rejected");
        return Err(AuthError::InvalidCredential.into());
    };

    let token = state.token_issuer.issue(&principal)?;
    record_auth_outcome("login", "password");
    info!(principal_id = %principal.id(), role = %principal.role(), "Principal logged in");

    Ok(Json(token))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    match state.pipeline.resolver().refresh(request.token.trim()).await? {
        Some(token) => {
            record_auth_outcome("refreshed", "bearer_token");
            Ok(Json(token))
        }
        None => {
            record_auth_outcome("refresh_refused", "bearer_token");
            Err(ApiError::from(AuthError::InvalidCredential)
                .with_code("refresh_refused"))
        }
    }
}

/// GET /api/v1/auth/me
pub async fn me(Authenticated(admission): Authenticated) -> Json<PrincipalResponse> {
    let context = admission.context;
    let principal = &context.principal;

    let mut resource_scopes: Vec<String> = principal.resource_scopes().iter().cloned().collect();
    resource_scopes.sort();

    Json(PrincipalResponse {
        id: principal.id().to_string(),
        username: principal.username().to_string(),
        email: principal.email().map(str::to_string),
        role: principal.role(),
        permissions: principal.sorted_permissions(),
        resource_scopes,
        tier: context.tier,
        authenticated_with: context.credential_kind,
    })
}
