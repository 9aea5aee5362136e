use serde::Deserialize;

use crate::domain::rate_limit::{RateTier, TierTable};
use crate::domain::DomainError;
use crate::infrastructure::auth::MAX_EXPIRATION_MINUTES;

/// Placeholder shipped in older sample configs, never accepted as a key
const PLACEHOLDER_JWT_SECRET: &str = "change-me-in-production";

/// Shortest configured HMAC secret accepted
const MIN_JWT_SECRET_BYTES: usize = 32;

/// Application configuration
///
/// Layered from `config/default`, `config/local` and `GATEWAY__*` environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub api_keys: ApiKeysConfig,
    pub rate_limits: RateLimitsConfig,
    pub metrics: MetricsConfig,
    pub principals: PrincipalsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Bearer token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret. When unset a random per-process secret is generated.
    pub jwt_secret: Option<String>,
    /// HS256, HS384 or HS512
    pub jwt_algorithm: String,
    pub token_expiration_minutes: u64,
    pub issuer: String,
    /// Let `/auth/refresh` accept authentic but expired tokens
    pub refresh_accepts_expired: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    pub prefix: String,
    pub key_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    pub tiers: TierTable,
    /// Tier applied to bearer-token callers
    pub bearer_tier: RateTier,
    /// Tier reported for keys the registry does not know
    pub unknown_key_tier: RateTier,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrincipalsConfig {
    /// Seed the admin / architect / developer demo logins
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: "HS256".to_string(),
            token_expiration_minutes: 1_440,
            issuer: "pmp-auth-gateway".to_string(),
            refresh_accepts_expired: false,
        }
    }
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            prefix: "pmp_".to_string(),
            key_bytes: 32,
        }
    }
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            bearer_tier: RateTier::Basic,
            unknown_key_tier: RateTier::Free,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for PrincipalsConfig {
    fn default() -> Self {
        Self { seed_demo: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the gateway cannot start with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.rate_limits.tiers.validate()?;

        if let Some(secret) = &self.auth.jwt_secret {
            if secret == PLACEHOLDER_JWT_SECRET {
                return Err(DomainError::configuration(
                    "auth.jwt_secret is still the sample placeholder",
                ));
            }
            if secret.len() < MIN_JWT_SECRET_BYTES {
                return Err(DomainError::configuration(format!(
                    "auth.jwt_secret must be at least {} bytes",
                    MIN_JWT_SECRET_BYTES
                )));
            }
        }

        if self.auth.token_expiration_minutes == 0
            || self.auth.token_expiration_minutes > MAX_EXPIRATION_MINUTES
        {
            return Err(DomainError::configuration(format!(
                "auth.token_expiration_minutes must be between 1 and {}",
                MAX_EXPIRATION_MINUTES
            )));
        }

        if self.api_keys.prefix.is_empty() {
            return Err(DomainError::configuration("api_keys.prefix must not be empty"));
        }

        if !self.metrics.path.starts_with('/') {
            return Err(DomainError::configuration("metrics.path must start with '/'"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_limit::TierLimits;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.auth.token_expiration_minutes, 1_440);
        assert_eq!(config.auth.jwt_algorithm, "HS256");
        assert!(config.auth.jwt_secret.is_none());
        assert!(!config.auth.refresh_accepts_expired);
        assert_eq!(config.api_keys.prefix, "pmp_");
        assert_eq!(config.rate_limits.bearer_tier, RateTier::Basic);
        assert_eq!(config.rate_limits.unknown_key_tier, RateTier::Free);
        assert!(config.metrics.enabled);
        assert!(config.principals.seed_demo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9090

            [rate_limits]
            bearer_tier = "premium"

            [rate_limits.tiers.free]
            requests_per_minute = 5
            requests_per_hour = 50
            "#,
        );

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.rate_limits.bearer_tier, RateTier::Premium);
        assert_eq!(config.rate_limits.unknown_key_tier, RateTier::Free);
        assert_eq!(
            config.rate_limits.tiers.limits_for(RateTier::Free),
            TierLimits::new(5, 50)
        );
        assert_eq!(
            config.rate_limits.tiers.limits_for(RateTier::Premium),
            TierLimits::new(300, 10_000)
        );
        assert_eq!(config.auth.issuer, "pmp-auth-gateway");
    }

    #[test]
    fn test_validate_rejects_bad_tiers() {
        let mut config = AppConfig::default();
        config.rate_limits.tiers = config
            .rate_limits
            .tiers
            .with_limits(RateTier::Free, TierLimits::new(0, 100));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_weak_secrets() {
        let mut config = AppConfig::default();

        config.auth.jwt_secret = Some(String::new());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("change-me-in-production".to_string());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("short-secret".to_string());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("a".repeat(32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_from_file() {
        let config = from_toml(
            r#"
            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            "#,
        );

        assert_eq!(
            config.auth.jwt_secret.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_token_lifetime() {
        let mut config = AppConfig::default();

        config.auth.token_expiration_minutes = 0;
        assert!(config.validate().is_err());

        config.auth.token_expiration_minutes = u64::MAX;
        assert!(config.validate().is_err());

        config.auth.token_expiration_minutes = MAX_EXPIRATION_MINUTES + 1;
        assert!(config.validate().is_err());

        config.auth.token_expiration_minutes = MAX_EXPIRATION_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_metrics_path() {
        let mut config = AppConfig::default();
        config.metrics.path = "metrics".to_string();
        assert!(config.validate().is_err());
    }
}
