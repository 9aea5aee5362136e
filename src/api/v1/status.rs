//! Caller quota status

use serde::Serialize;

use crate::api::middleware::Authenticated;
use crate::api::types::Json;
use crate::domain::auth::CredentialKind;
use crate::domain::rate_limit::{RateLimitStatus, RateTier};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub principal_id: String,
    pub tier: RateTier,
    pub authenticated_with: CredentialKind,
    pub rate_limit: RateLimitStatus,
}

/// GET /api/v1/status
///
/// The check that admitted this request counts against the quota it reports.
pub async fn status(Authenticated(admission): Authenticated) -> Json<StatusResponse> {
    Json(StatusResponse {
        principal_id: admission.context.principal.id().to_string(),
        tier: admission.context.tier,
        authenticated_with: admission.context.credential_kind,
        rate_limit: admission.rate_limit,
    })
}
