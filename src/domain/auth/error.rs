//! Failure taxonomy of the authentication pipeline

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::rate_limit::{DenialReason, LimitType, RateLimitDenial};
use crate::domain::DomainError;

/// Typed failure returned by any pipeline stage
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("No API key or bearer token was provided")]
    MissingCredential,

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Credentials have expired")]
    ExpiredCredential,

    #[error("Rate limit exceeded ({limit_type}): retry after {retry_after} seconds")]
    RateLimited {
        limit_type: LimitType,
        retry_after: u64,
        reset_at: DateTime<Utc>,
        limit: u32,
        current: u32,
    },

    #[error("Temporarily blocked due to rate limit violation: retry after {retry_after} seconds")]
    TemporarilyBlocked {
        retry_after: u64,
        reset_at: DateTime<Utc>,
    },

    #[error("Missing required permission: {permission}")]
    Forbidden { permission: String },

    #[error("Principal not found")]
    PrincipalNotFound,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn forbidden(permission: impl Into<String>) -> Self {
        Self::Forbidden {
            permission: permission.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable kind, used as the error code on the wire and as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::ExpiredCredential => "expired_credential",
            Self::RateLimited { .. } => "rate_limited",
            Self::TemporarilyBlocked { .. } => "temporarily_blocked",
            Self::Forbidden { .. } => "forbidden",
            Self::PrincipalNotFound => "principal_not_found",
            Self::Internal { .. } => "internal",
        }
    }

    /// Seconds the caller should wait, for the two rate-limit kinds
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } | Self::TemporarilyBlocked { retry_after, .. } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::RateLimited { reset_at, .. } | Self::TemporarilyBlocked { reset_at, .. } => {
                Some(*reset_at)
            }
            _ => None,
        }
    }
}

impl From<RateLimitDenial> for AuthError {
    fn from(denial: RateLimitDenial) -> Self {
        match (denial.reason, denial.limit_type) {
            (DenialReason::RateLimitExceeded, Some(limit_type)) => Self::RateLimited {
                limit_type,
                retry_after: denial.retry_after,
                reset_at: denial.reset_at,
                limit: denial.limit.unwrap_or_default(),
                current: denial.current.unwrap_or_default(),
            },
            _ => Self::TemporarilyBlocked {
                retry_after: denial.retry_after,
                reset_at: denial.reset_at,
            },
        }
    }
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::MissingCredential.kind(), "missing_credential");
        assert_eq!(AuthError::forbidden("account:delete").kind(), "forbidden");
        assert_eq!(AuthError::internal("boom").kind(), "internal");
    }

    #[test]
    fn test_forbidden_message_names_permission() {
        let err = AuthError::forbidden("account:delete");
        assert_eq!(
            err.to_string(),
            "Missing required permission: account:delete"
        );
    }

    #[test]
    fn test_from_threshold_denial() {
        let reset_at = Utc::now();
        let err: AuthError = RateLimitDenial {
            reason: DenialReason::RateLimitExceeded,
            limit_type: Some(LimitType::PerMinute),
            retry_after: 60,
            reset_at,
            current: Some(10),
            limit: Some(10),
        }
        .into();

        assert_eq!(
            err,
            AuthError::RateLimited {
                limit_type: LimitType::PerMinute,
                retry_after: 60,
                reset_at,
                limit: 10,
                current: 10,
            }
        );
        assert_eq!(err.retry_after(), Some(60));
        assert_eq!(err.reset_at(), Some(reset_at));
    }

    #[test]
    fn test_from_cooldown_denial() {
        let reset_at = Utc::now();
        let err: AuthError = RateLimitDenial {
            reason: DenialReason::TemporarilyBlocked,
            limit_type: None,
            retry_after: 7,
            reset_at,
            current: None,
            limit: None,
        }
        .into();

        assert_eq!(
            err,
            AuthError::TemporarilyBlocked {
                retry_after: 7,
                reset_at
            }
        );
    }

    #[test]
    fn test_from_domain_error_is_internal() {
        let err: AuthError = DomainError::internal("corrupted record").into();
        assert_eq!(err.kind(), "internal");
        assert!(err.retry_after().is_none());
    }
}
