//! Request credentials and the context handed to downstream handlers

use serde::Serialize;

use crate::domain::principal::Principal;
use crate::domain::rate_limit::{RateLimitStatus, RateTier};

/// Raw credentials taken from request metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
    bearer_token: Option<String>,
}

impl Credentials {
    /// Build from optional raw values; blank values count as absent
    pub fn new(api_key: Option<String>, bearer_token: Option<String>) -> Self {
        Self {
            api_key: non_blank(api_key),
            bearer_token: non_blank(bearer_token),
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self::new(Some(key.into()), None)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(None, Some(token.into()))
    }

    pub fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn bearer_token_value(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.bearer_token.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Which credential authenticated the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    ApiKey,
    BearerToken,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::BearerToken => "bearer_token",
        }
    }
}

/// Resolved caller identity
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    /// Key under which rate-limit state is tracked
    pub rate_limit_identifier: String,
    pub tier: RateTier,
    pub credential_kind: CredentialKind,
}

/// A request that passed every pipeline stage
#[derive(Debug, Clone)]
pub struct Admission {
    pub context: AuthContext,
    pub rate_limit: RateLimitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let creds = Credentials::new(Some("   ".to_string()), Some(String::new()));
        assert!(creds.is_empty());
        assert!(creds.api_key_value().is_none());
    }

    #[test]
    fn test_values_are_trimmed() {
        let creds = Credentials::new(Some(" pmp_abc ".to_string()), Some("tok".to_string()));
        assert_eq!(creds.api_key_value(), Some("pmp_abc"));
        assert_eq!(creds.bearer_token_value(), Some("tok"));
        assert!(!creds.is_empty());
    }

    #[test]
    fn test_constructors() {
        assert_eq!(Credentials::api_key("k").api_key_value(), Some("k"));
        assert!(Credentials::api_key("k").bearer_token_value().is_none());
        assert_eq!(Credentials::bearer("t").bearer_token_value(), Some("t"));
    }
}
