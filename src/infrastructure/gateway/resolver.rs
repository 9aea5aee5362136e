//! Credential resolution: API key or bearer token to an authenticated context

use std::sync::Arc;

use tracing::debug;

use crate::domain::auth::{AuthContext, AuthError, CredentialKind, Credentials};
use crate::domain::principal::{Principal, PrincipalId, PrincipalStore};
use crate::domain::rate_limit::RateTier;
use crate::domain::token::IssuedToken;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::auth::TokenIssuer;

/// First pipeline stage
///
/// An API key takes priority over a bearer token. Validating a key counts a use even
/// when a later stage rejects the request.
#[derive(Clone)]
pub struct CredentialResolver {
    api_keys: Arc<ApiKeyService>,
    tokens: Arc<dyn TokenIssuer>,
    principals: Arc<dyn PrincipalStore>,
    bearer_tier: RateTier,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("api_keys", &self.api_keys)
            .field("tokens", &self.tokens)
            .field("bearer_tier", &self.bearer_tier)
            .finish_non_exhaustive()
    }
}

impl CredentialResolver {
    pub fn new(
        api_keys: Arc<ApiKeyService>,
        tokens: Arc<dyn TokenIssuer>,
        principals: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            api_keys,
            tokens,
            principals,
            bearer_tier: RateTier::Basic,
        }
    }

    /// Tier applied to bearer-token callers
    pub fn with_bearer_tier(mut self, tier: RateTier) -> Self {
        self.bearer_tier = tier;
        self
    }

    pub async fn resolve(&self, credentials: &Credentials) -> Result<AuthContext, AuthError> {
        if let Some(secret) = credentials.api_key_value() {
            return self.resolve_api_key(secret).await;
        }

        if let Some(token) = credentials.bearer_token_value() {
            return self.resolve_bearer(token).await;
        }

        Err(AuthError::MissingCredential)
    }

    async fn resolve_api_key(&self, secret: &str) -> Result<AuthContext, AuthError> {
        let record = self
            .api_keys
            .validate(secret)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        let principal = self.load_principal(record.owner_id()).await?;

        Ok(AuthContext {
            rate_limit_identifier: principal.id().as_str().to_string(),
            principal,
            tier: record.tier(),
            credential_kind: CredentialKind::ApiKey,
        })
    }

    async fn resolve_bearer(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.tokens.verify(token)?;

        let id = PrincipalId::new(claims.sub).map_err(|e| {
            debug!(error = %e, "Bearer token subject is not a valid principal id");
            AuthError::InvalidCredential
        })?;
        let principal = self.load_principal(&id).await?;

        Ok(AuthContext {
            rate_limit_identifier: principal.id().as_str().to_string(),
            principal,
            tier: self.bearer_tier,
            credential_kind: CredentialKind::BearerToken,
        })
    }

    /// Re-issue a bearer token from the principal's current record
    ///
    /// `None` when the token is refused or its principal is gone or inactive. Role and
    /// permissions come from the store, not from the presented token.
    pub async fn refresh(&self, token: &str) -> Result<Option<IssuedToken>, AuthError> {
        let Some(claims) = self.tokens.refreshable_claims(token)? else {
            return Ok(None);
        };

        let Ok(id) = PrincipalId::new(claims.sub) else {
            return Ok(None);
        };

        match self.load_principal(&id).await {
            Ok(principal) => self.tokens.issue(&principal).map(Some),
            Err(AuthError::PrincipalNotFound | AuthError::InvalidCredential) => {
                debug!(principal_id = %id, "Refresh refused for unavailable principal");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn load_principal(&self, id: &PrincipalId) -> Result<Principal, AuthError> {
        let principal = self
            .principals
            .get(id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !principal.is_active() {
            debug!(principal_id = %id, "Principal is inactive");
            return Err(AuthError::InvalidCredential);
        }

        Ok(principal)
    }
}
