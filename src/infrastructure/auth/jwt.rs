//! Bearer token issuing and verification (HMAC-signed JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt::Debug;
use tracing::debug;

use crate::domain::auth::AuthError;
use crate::domain::principal::Principal;
use crate::domain::token::{IssuedToken, TokenClaims};
use crate::domain::DomainError;

/// Longest token lifetime the service accepts (one year)
pub const MAX_EXPIRATION_MINUTES: u64 = 525_600;

/// Generate a random 64 character signing secret
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret
    pub secret: String,
    pub algorithm: Algorithm,
    pub expiration_minutes: u64,
    /// Fixed `iss` claim, also required on verification
    pub issuer: String,
    /// Allow refreshing an authentic token whose expiry has passed
    pub refresh_accepts_expired: bool,
}

impl TokenConfig {
    /// Create new token configuration with HS256 and a 24 hour lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_expiration_minutes(mut self, minutes: u64) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_refresh_accepts_expired(mut self, accept: bool) -> Self {
        self.refresh_accepts_expired = accept;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: generate_secret(),
            algorithm: Algorithm::HS256,
            expiration_minutes: 1_440,
            issuer: "pmp-auth-gateway".to_string(),
            refresh_accepts_expired: false,
        }
    }
}

/// Parse a configured algorithm name, accepting only the HMAC family
pub fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::configuration(format!(
            "Unsupported JWT algorithm '{}'. Use HS256, HS384 or HS512",
            other
        ))),
    }
}

/// Trait for bearer token operations
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue a token for a principal
    fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError>;

    /// Verify signature, issuer and expiry, returning the claims
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Decode a token presented for refresh, `None` when it is refused.
    ///
    /// Expired tokens pass only when the service allows it. The caller re-issues from
    /// the current principal, never from these claims.
    fn refreshable_claims(&self, token: &str) -> Result<Option<TokenClaims>, AuthError>;

    /// Token lifetime in seconds
    fn expiration_seconds(&self) -> u64;
}

/// JWT token service
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.config.algorithm)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .field("issuer", &self.config.issuer)
            .field("refresh_accepts_expired", &self.config.refresh_accepts_expired)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service
    pub fn new(config: TokenConfig) -> Result<Self, DomainError> {
        if !matches!(
            config.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::configuration(format!(
                "Unsupported JWT algorithm {:?}",
                config.algorithm
            )));
        }

        if config.secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }

        if config.expiration_minutes == 0 || config.expiration_minutes > MAX_EXPIRATION_MINUTES {
            return Err(DomainError::configuration(format!(
                "Token lifetime must be between 1 and {} minutes",
                MAX_EXPIRATION_MINUTES
            )));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation
    }

    fn decode(&self, token: &str, validate_exp: bool) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation(validate_exp))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => {
                    debug!(error = %e, "Bearer token rejected");
                    AuthError::InvalidCredential
                }
            })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<IssuedToken, AuthError> {
        let access_token = encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken::bearer(
            access_token,
            self.expiration_seconds(),
            claims.sub.clone(),
            claims.role,
        ))
    }

    fn lifetime(&self) -> Duration {
        Duration::minutes(self.config.expiration_minutes as i64)
    }
}

impl TokenIssuer for TokenService {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims::for_principal(
            principal,
            &self.config.issuer,
            Utc::now(),
            self.lifetime(),
        );
        self.sign(&claims)
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode(token, true)
    }

    fn refreshable_claims(&self, token: &str) -> Result<Option<TokenClaims>, AuthError> {
        match self.decode(token, !self.config.refresh_accepts_expired) {
            Ok(claims) => Ok(Some(claims)),
            Err(AuthError::ExpiredCredential | AuthError::InvalidCredential) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn expiration_seconds(&self) -> u64 {
        self.config.expiration_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::principal::{PrincipalId, Role};

    fn principal() -> Principal {
        Principal::new(PrincipalId::new("user-002").unwrap(), "architect", Role::Architect)
            .with_email("architect@demo.local")
    }

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret-key-12345")).unwrap()
    }

    /// Token with an expiry one hour in the past, signed with `secret`
    fn expired_token(secret: &str) -> String {
        let past = Utc::now() - Duration::hours(1);
        let claims = TokenClaims::for_principal(
            &principal(),
            "pmp-auth-gateway",
            past - Duration::hours(2),
            Duration::hours(2),
        );
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();

        let issued = service.issue(&principal()).unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 86_400);
        assert_eq!(issued.principal_id, "user-002");

        let claims = service.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "user-002");
        assert_eq!(claims.username, "architect");
        assert_eq!(claims.email.as_deref(), Some("architect@demo.local"));
        assert_eq!(claims.role, Role::Architect);
        assert_eq!(claims.iss, "pmp-auth-gateway");
        assert!(claims.permissions.contains(&"policy:update".to_string()));
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(
            service().verify("invalid-token").unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[test]
    fn test_wrong_secret() {
        let other = TokenService::new(TokenConfig::new("secret-2")).unwrap();
        let token = other.issue(&principal()).unwrap().access_token;

        assert_eq!(service().verify(&token).unwrap_err(), AuthError::InvalidCredential);
    }

    #[test]
    fn test_expired_token() {
        let token = expired_token("test-secret-key-12345");
        assert_eq!(service().verify(&token).unwrap_err(), AuthError::ExpiredCredential);
    }

    #[test]
    fn test_expired_token_with_bad_signature_is_invalid() {
        let token = expired_token("someone-else");
        assert_eq!(service().verify(&token).unwrap_err(), AuthError::InvalidCredential);
    }

    #[test]
    fn test_wrong_issuer() {
        let other = TokenService::new(
            TokenConfig::new("test-secret-key-12345").with_issuer("someone-else"),
        )
        .unwrap();
        let token = other.issue(&principal()).unwrap().access_token;

        assert_eq!(service().verify(&token).unwrap_err(), AuthError::InvalidCredential);
    }

    #[test]
    fn test_algorithm_mismatch() {
        let hs512 = TokenService::new(
            TokenConfig::new("test-secret-key-12345").with_algorithm(Algorithm::HS512),
        )
        .unwrap();
        let token = hs512.issue(&principal()).unwrap().access_token;

        assert!(hs512.verify(&token).is_ok());
        assert_eq!(service().verify(&token).unwrap_err(), AuthError::InvalidCredential);
    }

    #[test]
    fn test_refreshable_claims_of_valid_token() {
        let service = service();
        let issued = service.issue(&principal()).unwrap();

        let claims = service
            .refreshable_claims(&issued.access_token)
            .unwrap()
            .unwrap();
        assert_eq!(claims.sub, "user-002");
        assert_eq!(claims.role, Role::Architect);
    }

    #[test]
    fn test_refresh_expired_token_refused_by_default() {
        let token = expired_token("test-secret-key-12345");
        assert!(service().refreshable_claims(&token).unwrap().is_none());
    }

    #[test]
    fn test_refresh_expired_token_when_permitted() {
        let service = TokenService::new(
            TokenConfig::new("test-secret-key-12345").with_refresh_accepts_expired(true),
        )
        .unwrap();
        let token = expired_token("test-secret-key-12345");

        let claims = service.refreshable_claims(&token).unwrap().unwrap();
        assert_eq!(claims.sub, "user-002");

        // Signature is still checked
        assert!(service
            .refreshable_claims(&expired_token("forged"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_refresh_garbage() {
        assert!(service().refreshable_claims("garbage").unwrap().is_none());
    }

    #[test]
    fn test_default_config_never_uses_a_fixed_secret() {
        let first = TokenConfig::default();
        let second = TokenConfig::default();

        assert_eq!(first.secret.len(), 64);
        assert_ne!(first.secret, second.secret);
        assert_ne!(first.secret, "change-me-in-production");
    }

    #[test]
    fn test_rejects_out_of_range_lifetime() {
        let zero = TokenConfig::new("test-secret-key-12345").with_expiration_minutes(0);
        assert!(TokenService::new(zero).is_err());

        let too_long = TokenConfig::new("test-secret-key-12345")
            .with_expiration_minutes(MAX_EXPIRATION_MINUTES + 1);
        assert!(TokenService::new(too_long).is_err());

        let year = TokenConfig::new("test-secret-key-12345")
            .with_expiration_minutes(MAX_EXPIRATION_MINUTES);
        assert!(TokenService::new(year).is_ok());
    }

    #[test]
    fn test_rejects_non_hmac_algorithm() {
        let config = TokenConfig::new("secret").with_algorithm(Algorithm::RS256);
        assert!(TokenService::new(config).is_err());
        assert!(TokenService::new(TokenConfig::new("")).is_err());
    }

    #[test]
    fn test_parse_hmac_algorithm() {
        assert_eq!(parse_hmac_algorithm("hs384").unwrap(), Algorithm::HS384);
        assert!(parse_hmac_algorithm("RS256").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", service());
        assert!(!debug.contains("test-secret-key-12345"));
    }
}
