//! Outcome of a rate-limit check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which window was exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitType {
    PerMinute,
    PerHour,
}

impl LimitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerMinute => "per_minute",
            Self::PerHour => "per_hour",
        }
    }
}

impl std::fmt::Display for LimitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// A window threshold was crossed by this request
    RateLimitExceeded,
    /// The identifier is inside a cooldown started by an earlier violation
    TemporarilyBlocked,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimitExceeded => write!(f, "rate_limit_exceeded"),
            Self::TemporarilyBlocked => write!(f, "temporarily_blocked"),
        }
    }
}

/// Quota telemetry for an allowed request, exposed as response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit_per_minute: u32,
    pub remaining_minute: u32,
    pub limit_per_hour: u32,
    pub remaining_hour: u32,
}

/// Details of a denied request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDenial {
    pub reason: DenialReason,
    /// Set when this request crossed a threshold, absent during cooldown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_type: Option<LimitType>,
    /// Whole seconds until the identifier may retry
    pub retry_after: u64,
    /// Instant at which the cooldown ends
    pub reset_at: DateTime<Utc>,
    /// Requests counted in the violated window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    /// Limit of the violated window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Result of [`RateLimiter::check`](crate::infrastructure::rate_limit::RateLimiter::check)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed(RateLimitStatus),
    Denied(RateLimitDenial),
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    pub fn status(&self) -> Option<&RateLimitStatus> {
        match self {
            Self::Allowed(status) => Some(status),
            Self::Denied(_) => None,
        }
    }

    pub fn denial(&self) -> Option<&RateLimitDenial> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(denial) => Some(denial),
        }
    }
}
