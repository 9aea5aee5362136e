//! Gateway admission middleware
//!
//! Reads credentials from the `X-API-Key` and `Authorization: Bearer` headers, runs the
//! admission pipeline and publishes rate-limit headers on the response.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::principal::permissions::ADMIN_RATE_LIMITS;
use crate::domain::{Admission, AuthError, Credentials, RateLimitStatus};
use crate::infrastructure::gateway::AccessRequirement;

pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
pub const LIMIT_MINUTE_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit-minute");
pub const REMAINING_MINUTE_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining-minute");
pub const LIMIT_HOUR_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit-hour");
pub const REMAINING_HOUR_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining-hour");

/// Admission of the current request, available to handlers behind [`authenticate`]
#[derive(Debug, Clone)]
pub struct Authenticated(pub Admission);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Admission>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::internal("Route is missing the admission middleware"))
    }
}

/// Admit any authenticated caller within its rate limits
pub async fn authenticate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    admit(&state, AccessRequirement::authenticated(), request, next).await
}

/// Admit callers allowed to inspect limiter state
pub async fn require_rate_limit_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    admit(
        &state,
        AccessRequirement::permission(ADMIN_RATE_LIMITS),
        request,
        next,
    )
    .await
}

async fn admit(
    state: &AppState,
    requirement: AccessRequirement,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(request.headers())?;
    let admission = state.pipeline.admit(&credentials, &requirement).await?;
    let status = admission.rate_limit;

    request.extensions_mut().insert(admission);

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &status);
    Ok(response)
}

/// Pull both credential kinds out of the request headers
///
/// The `Bearer` scheme matches case-insensitively. Any other scheme counts as no bearer
/// token. A header that is not valid UTF-8 is an invalid credential.
pub fn extract_credentials(headers: &HeaderMap) -> Result<Credentials, ApiError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .map(header_text)
        .transpose()?
        .map(str::to_string);

    let bearer = headers
        .get(header::AUTHORIZATION)
        .map(header_text)
        .transpose()?
        .and_then(bearer_token)
        .map(str::to_string);

    Ok(Credentials::new(api_key, bearer))
}

fn header_text(value: &HeaderValue) -> Result<&str, ApiError> {
    value
        .to_str()
        .map_err(|_| ApiError::from(AuthError::InvalidCredential))
}

fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

pub fn apply_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(LIMIT_MINUTE_HEADER, HeaderValue::from(status.limit_per_minute));
    headers.insert(REMAINING_MINUTE_HEADER, HeaderValue::from(status.remaining_minute));
    headers.insert(LIMIT_HOUR_HEADER, HeaderValue::from(status.limit_per_hour));
    headers.insert(REMAINING_HOUR_HEADER, HeaderValue::from(status.remaining_hour));
}
