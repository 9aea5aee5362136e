//! Bearer token claims

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::principal::{Principal, Role};

/// Signed payload of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (principal ID)
    pub sub: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    /// Claims for a principal, valid from `now` for `lifetime`
    pub fn for_principal(
        principal: &Principal,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: principal.id().as_str().to_string(),
            username: principal.username().to_string(),
            email: principal.email().map(str::to_string),
            role: principal.role(),
            permissions: principal.sorted_permissions(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.into(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }
}

/// An encoded token as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
    pub principal_id: String,
    pub role: Role,
}

impl IssuedToken {
    pub fn bearer(
        access_token: String,
        expires_in: u64,
        principal_id: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            principal_id: principal_id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::principal::PrincipalId;

    #[test]
    fn test_claims_for_principal() {
        let principal = Principal::new(PrincipalId::new("user-003").unwrap(), "developer", Role::Developer)
            .with_email("developer@demo.local");
        let now = Utc::now();

        let claims = TokenClaims::for_principal(&principal, "pmp-auth-gateway", now, Duration::minutes(30));

        assert_eq!(claims.subject(), "user-003");
        assert_eq!(claims.username, "developer");
        assert_eq!(claims.email.as_deref(), Some("developer@demo.local"));
        assert_eq!(claims.role, Role::Developer);
        assert_eq!(claims.exp - claims.iat, 1800);
        assert_eq!(claims.iss, "pmp-auth-gateway");
        assert!(claims.permissions.contains(&"deployment:create".to_string()));
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::minutes(30)));
    }

    #[test]
    fn test_issued_token_type() {
        let token = IssuedToken::bearer("abc".to_string(), 60, "user-001", Role::Admin);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 60);
    }
}
