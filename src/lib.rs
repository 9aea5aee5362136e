//! PMP Auth Gateway
//!
//! Authenticates requests by API key or bearer token, applies tiered sliding-window rate
//! limits with cooldowns, and checks role-based permissions before handing the request
//! to downstream handlers.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::principal::PrincipalStore;
use domain::DomainError;
use infrastructure::{
    api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository},
    auth::{
        generate_secret, parse_hmac_algorithm, Argon2Hasher, PasswordHasher, TokenConfig,
        TokenService,
    },
    gateway::{AuthPipeline, CredentialResolver},
    principal::InMemoryPrincipalStore,
    rate_limit::RateLimiter,
};
use tracing::{info, warn};

/// Build application state from configuration, seeding demo principals when enabled
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    let principals = if config.principals.seed_demo {
        InMemoryPrincipalStore::with_demo_principals(hasher.as_ref()).await?
    } else {
        info!("Demo principals disabled, principal store starts empty");
        InMemoryPrincipalStore::new()
    };

    Ok(build_app_state(config, Arc::new(principals), hasher)?)
}

/// Wire every service around an existing principal store
pub fn build_app_state(
    config: &AppConfig,
    principal_store: Arc<dyn PrincipalStore>,
    password_hasher: Arc<dyn PasswordHasher>,
) -> Result<AppState, DomainError> {
    config.validate()?;

    let api_key_service = Arc::new(
        ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()))
            .with_generator(
                ApiKeyGenerator::new(&config.api_keys.prefix)
                    .with_key_bytes(config.api_keys.key_bytes),
            )
            .with_unknown_key_tier(config.rate_limits.unknown_key_tier),
    );

    let jwt_secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!("auth.jwt_secret not set, generating a random secret. Tokens will not survive a restart");
        generate_secret()
    });

    let token_issuer = Arc::new(TokenService::new(
        TokenConfig::new(jwt_secret)
            .with_algorithm(parse_hmac_algorithm(&config.auth.jwt_algorithm)?)
            .with_expiration_minutes(config.auth.token_expiration_minutes)
            .with_issuer(&config.auth.issuer)
            .with_refresh_accepts_expired(config.auth.refresh_accepts_expired),
    )?);

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limits.tiers.clone()));

    let resolver = CredentialResolver::new(
        api_key_service.clone(),
        token_issuer.clone(),
        principal_store.clone(),
    )
    .with_bearer_tier(config.rate_limits.bearer_tier);

    let pipeline = Arc::new(AuthPipeline::new(resolver, rate_limiter.clone()));

    Ok(AppState {
        api_key_service,
        rate_limiter,
        token_issuer,
        principal_store,
        password_hasher,
        pipeline,
        rate_limits: Arc::new(config.rate_limits.clone()),
        metrics: None,
    })
}
