//! Authentication pipeline
//!
//! Credential resolution, rate limiting and authorization run in that order; the first
//! failing stage ends the request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::auth::{Admission, AuthError, Credentials};
use crate::domain::rate_limit::RateLimitDecision;
use crate::infrastructure::auth::AuthorizationChecker;
use crate::infrastructure::observability::{record_auth_outcome, record_rate_limit_decision};
use crate::infrastructure::rate_limit::RateLimiter;

use super::resolver::CredentialResolver;

/// What a route demands of the caller beyond authentication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    permission: Option<String>,
    resource_scope: Option<String>,
}

impl AccessRequirement {
    /// Any authenticated, non-throttled caller
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn permission(permission: impl Into<String>) -> Self {
        Self {
            permission: Some(permission.into()),
            resource_scope: None,
        }
    }

    pub fn with_resource_scope(mut self, scope: impl Into<String>) -> Self {
        self.resource_scope = Some(scope.into());
        self
    }
}

/// Downstream work run only for admitted requests
#[async_trait]
pub trait RequestHandler: Send + Sync {
    type Output: Send;

    async fn handle(&self, admission: Admission) -> Result<Self::Output, AuthError>;
}

/// The gateway's request admission pipeline
#[derive(Debug, Clone)]
pub struct AuthPipeline {
    resolver: CredentialResolver,
    rate_limiter: Arc<RateLimiter>,
    authorizer: AuthorizationChecker,
}

impl AuthPipeline {
    pub fn new(resolver: CredentialResolver, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            resolver,
            rate_limiter,
            authorizer: AuthorizationChecker::new(),
        }
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn authorizer(&self) -> &AuthorizationChecker {
        &self.authorizer
    }

    /// Run every stage for one request
    pub async fn admit(
        &self,
        credentials: &Credentials,
        requirement: &AccessRequirement,
    ) -> Result<Admission, AuthError> {
        let credential = credential_label(credentials);
        let result = self.run_stages(credentials, requirement).await;

        match &result {
            Ok(admission) => {
                record_auth_outcome("admitted", credential);
                debug!(
                    principal_id = %admission.context.principal.id(),
                    tier = %admission.context.tier,
                    remaining_minute = admission.rate_limit.remaining_minute,
                    "Request admitted"
                );
            }
            Err(AuthError::Internal { message }) => {
                record_auth_outcome("internal", credential);
                warn!(credential, error = %message, "Request failed with internal error");
            }
            Err(e) => {
                record_auth_outcome(e.kind(), credential);
                info!(credential, outcome = e.kind(), "Request rejected");
            }
        }

        result
    }

    /// Admit the request, then hand it to `handler`
    pub async fn dispatch<H: RequestHandler>(
        &self,
        credentials: &Credentials,
        requirement: &AccessRequirement,
        handler: &H,
    ) -> Result<H::Output, AuthError> {
        let admission = self.admit(credentials, requirement).await?;
        handler.handle(admission).await
    }

    async fn run_stages(
        &self,
        credentials: &Credentials,
        requirement: &AccessRequirement,
    ) -> Result<Admission, AuthError> {
        let context = self.resolver.resolve(credentials).await?;

        let decision = self
            .rate_limiter
            .check(&context.rate_limit_identifier, context.tier)
            .await;

        let rate_limit = match decision {
            RateLimitDecision::Allowed(status) => {
                record_rate_limit_decision(context.tier.as_str(), "allowed");
                status
            }
            RateLimitDecision::Denied(denial) => {
                record_rate_limit_decision(context.tier.as_str(), "denied");
                return Err(denial.into());
            }
        };

        if let Some(permission) = &requirement.permission {
            self.authorizer
                .require_permission(&context.principal, permission)?;
        }

        if let Some(scope) = &requirement.resource_scope {
            self.authorizer
                .require_resource_access(&context.principal, scope)?;
        }

        Ok(Admission {
            context,
            rate_limit,
        })
    }
}

fn credential_label(credentials: &Credentials) -> &'static str {
    if credentials.api_key_value().is_some() {
        "api_key"
    } else if credentials.bearer_token_value().is_some() {
        "bearer_token"
    } else {
        "none"
    }
}
