//! API key self-service for the authenticated principal

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Authenticated;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::rate_limit::{RateTier, TierLimits};
use crate::domain::ApiKeyRecord;
use crate::infrastructure::observability::record_api_key_event;

#[derive(Debug, Default, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Defaults to the free tier
    #[serde(default)]
    pub tier: RateTier,
}

#[derive(Debug, Deserialize)]
pub struct RevokeApiKeyRequest {
    pub api_key: String,
}

/// Response to key creation; the only time the secret is returned
#[derive(Debug, Serialize)]
pub struct CreateApiKeyResponse {
    pub api_key: String,
    pub preview: String,
    pub tier: RateTier,
    pub limits: TierLimits,
    pub created_at: DateTime<Utc>,
}

/// Masked key as shown in listings
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub preview: String,
    pub tier: RateTier,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage_count: u64,
    pub requests_today: u64,
}

impl From<&ApiKeyRecord> for ApiKeyResponse {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            preview: record.preview().to_string(),
            tier: record.tier(),
            active: record.is_active(),
            created_at: record.created_at(),
            last_used_at: record.last_used_at(),
            usage_count: record.usage_count(),
            requests_today: record.requests_today(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeyResponse>,
}

#[derive(Debug, Serialize)]
pub struct RevokeApiKeyResponse {
    pub revoked: bool,
    pub preview: String,
}

/// POST /api/v1/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    Authenticated(admission): Authenticated,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>), ApiError> {
    let owner = admission.context.principal.id();
    let created = state.api_key_service.generate(owner, request.tier).await?;
    record_api_key_event("created");

    Ok((
        StatusCode::CREATED,
        Json(CreateApiKeyResponse {
            api_key: created.secret,
            preview: created.record.preview().to_string(),
            tier: created.record.tier(),
            limits: state.rate_limits.tiers.limits_for(created.record.tier()),
            created_at: created.record.created_at(),
        }),
    ))
}

/// GET /api/v1/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    Authenticated(admission): Authenticated,
) -> Result<Json<ApiKeyListResponse>, ApiError> {
    let records = state
        .api_key_service
        .list_by_owner(admission.context.principal.id())
        .await?;

    Ok(Json(ApiKeyListResponse {
        keys: records.iter().map(ApiKeyResponse::from).collect(),
    }))
}

/// POST /api/v1/api-keys/revoke
///
/// Keys owned by someone else are reported as not found.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Authenticated(admission): Authenticated,
    Json(request): Json<RevokeApiKeyRequest>,
) -> Result<Json<RevokeApiKeyResponse>, ApiError> {
    let record = state
        .api_key_service
        .revoke(request.api_key.trim(), admission.context.principal.id())
        .await
        .map_err(|e| ApiError::from(e).with_param("api_key"))?;
    record_api_key_event("revoked");

    Ok(Json(RevokeApiKeyResponse {
        revoked: true,
        preview: record.preview().to_string(),
    }))
}
