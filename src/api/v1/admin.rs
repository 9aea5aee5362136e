//! Operator view of limiter state

use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::rate_limit::RateTier;
use crate::infrastructure::observability::record_rate_limiter_occupancy;

#[derive(Debug, Serialize)]
pub struct TierEntry {
    pub tier: RateTier,
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
}

#[derive(Debug, Serialize)]
pub struct RateLimitStatsResponse {
    pub total_identifiers: usize,
    pub blocked_identifiers: usize,
    pub api_keys_issued: usize,
    pub bearer_tier: RateTier,
    pub unknown_key_tier: RateTier,
    pub tiers: Vec<TierEntry>,
}

/// GET /api/v1/admin/rate-limits
pub async fn rate_limit_stats(
    State(state): State<AppState>,
) -> Result<Json<RateLimitStatsResponse>, ApiError> {
    let stats = state.rate_limiter.stats().await;
    let api_keys_issued = state.api_key_service.count().await?;
    record_rate_limiter_occupancy(stats.total_identifiers, stats.blocked_identifiers);

    let tiers = state
        .rate_limiter
        .tiers()
        .iter()
        .map(|(tier, limits)| TierEntry {
            tier,
            requests_per_minute: limits.requests_per_minute,
            requests_per_hour: limits.requests_per_hour,
        })
        .collect();

    Ok(Json(RateLimitStatsResponse {
        total_identifiers: stats.total_identifiers,
        blocked_identifiers: stats.blocked_identifiers,
        api_keys_issued,
        bearer_tier: state.rate_limits.bearer_tier,
        unknown_key_tier: state.rate_limits.unknown_key_tier,
        tiers,
    }))
}
