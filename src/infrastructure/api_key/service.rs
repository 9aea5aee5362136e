//! API key registry
//!
//! Issues, validates and revokes API keys and keeps their usage counters.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::principal::PrincipalId;
use crate::domain::rate_limit::RateTier;
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;

/// Lookup id collisions are astronomically rare; give up after a few
const MAX_GENERATE_ATTEMPTS: usize = 3;

/// Result of issuing a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The stored record (hash and preview only)
    pub record: ApiKeyRecord,
    /// The full secret key (only returned once)
    pub secret: String,
}

/// API key registry service
#[derive(Debug)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    generator: ApiKeyGenerator,
    clock: Arc<dyn Clock>,
    unknown_key_tier: RateTier,
}

impl ApiKeyService {
    /// Create a new API key service
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            clock: Arc::new(SystemClock),
            unknown_key_tier: RateTier::Free,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create with a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tier reported by `tier_of` for keys that are not found
    pub fn with_unknown_key_tier(mut self, tier: RateTier) -> Self {
        self.unknown_key_tier = tier;
        self
    }

    /// Issue a new key for `owner_id`
    pub async fn generate(
        &self,
        owner_id: &PrincipalId,
        tier: RateTier,
    ) -> Result<CreateApiKeyResult, DomainError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let generated = self.generator.generate();
            let record = ApiKeyRecord::new(
                &generated.lookup_id,
                &generated.hash,
                &generated.preview,
                owner_id.clone(),
                tier,
                self.clock.now(),
            );

            match self.repository.insert(record.clone()).await {
                Ok(()) => {
                    info!(owner_id = %owner_id, tier = %tier, key = %generated.preview, "API key created");
                    return Ok(CreateApiKeyResult {
                        record,
                        secret: generated.secret,
                    });
                }
                Err(DomainError::Conflict { .. }) => {
                    warn!(lookup_id = %generated.lookup_id, "API key lookup id collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::internal(
            "Failed to generate a unique API key",
        ))
    }

    /// Validate a presented key, recording the use on success
    ///
    /// Returns `None` for unknown, malformed or revoked keys.
    pub async fn validate(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let Some(record) = self.find(secret).await? else {
            return Ok(None);
        };

        if !record.is_active() {
            debug!(lookup_id = %record.lookup_id(), "API key is revoked");
            return Ok(None);
        }

        // Re-checks the active flag under the record lock, so a concurrent revoke wins
        self.repository
            .record_usage(record.lookup_id(), self.clock.now())
            .await
    }

    /// Deactivate a key on behalf of its owner; idempotent
    ///
    /// Unknown keys and keys owned by another principal are both `NotFound`.
    pub async fn revoke(
        &self,
        secret: &str,
        owner_id: &PrincipalId,
    ) -> Result<ApiKeyRecord, DomainError> {
        let record = self
            .find(secret)
            .await?
            .filter(|r| r.owner_id() == owner_id)
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        if !self.repository.deactivate(record.lookup_id()).await? {
            return Err(DomainError::not_found("API key not found"));
        }

        info!(owner_id = %record.owner_id(), key = %record.preview(), "API key revoked");
        Ok(record)
    }

    /// Record for a presented key without counting a use, active or not
    pub async fn lookup(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.find(secret).await
    }

    /// All keys owned by a principal, masked
    pub async fn list_by_owner(
        &self,
        owner_id: &PrincipalId,
    ) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Stored tier of a key, or the fail-safe default for unknown keys
    pub async fn tier_of(&self, secret: &str) -> Result<RateTier, DomainError> {
        Ok(self
            .find(secret)
            .await?
            .map(|r| r.tier())
            .unwrap_or(self.unknown_key_tier))
    }

    /// Number of keys ever issued
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    async fn find(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let Some(lookup_id) = self.generator.lookup_id(secret) else {
            debug!("API key does not match the configured format");
            return Ok(None);
        };

        let Some(record) = self.repository.get(&lookup_id).await? else {
            return Ok(None);
        };

        if !self.generator.verify(secret, record.secret_hash()) {
            debug!(lookup_id = %lookup_id, "API key hash verification failed");
            return Ok(None);
        }

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;
    use chrono::{Duration, TimeZone, Utc};

    fn owner() -> PrincipalId {
        PrincipalId::new("user-001").unwrap()
    }

    fn service_with_clock(clock: Arc<ManualClock>) -> ApiKeyService {
        ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new())).with_clock(clock)
    }

    fn service() -> ApiKeyService {
        service_with_clock(Arc::new(ManualClock::default()))
    }

    #[tokio::test]
    async fn test_generate_and_validate() {
        let service = service();

        let created = service.generate(&owner(), RateTier::Premium).await.unwrap();
        assert!(created.secret.starts_with("pmp_"));
        assert_eq!(created.record.usage_count(), 0);

        let record = service.validate(&created.secret).await.unwrap().unwrap();
        assert_eq!(record.owner_id(), &owner());
        assert_eq!(record.tier(), RateTier::Premium);
        assert_eq!(record.usage_count(), 1);
        assert_eq!(record.requests_today(), 1);
        assert!(record.last_used_at().is_some());
    }

    #[tokio::test]
    async fn test_validate_unknown_and_malformed() {
        let service = service();
        service.generate(&owner(), RateTier::Free).await.unwrap();

        assert!(service.validate("pmp_doesnotexist1234").await.unwrap().is_none());
        assert!(service.validate("not-a-key").await.unwrap().is_none());
        assert!(service.validate("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_rejects_forged_secret_with_known_lookup_id() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Free).await.unwrap();

        let forged = format!("{}tampered", created.record.lookup_id());
        assert!(service.validate(&forged).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revocation_is_permanent() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Basic).await.unwrap();

        assert!(service.validate(&created.secret).await.unwrap().is_some());
        let revoked = service.revoke(&created.secret, &owner()).await.unwrap();
        assert_eq!(revoked.preview(), created.record.preview());

        for _ in 0..3 {
            assert!(service.validate(&created.secret).await.unwrap().is_none());
        }
        // Idempotent
        assert!(service.revoke(&created.secret, &owner()).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_unknown_or_foreign_key_is_not_found() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Basic).await.unwrap();
        let stranger = PrincipalId::new("user-003").unwrap();

        let err = service.revoke("pmp_unknownunknown", &owner()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = service.revoke(&created.secret, &stranger).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        // Still usable by its owner
        assert!(service.validate(&created.secret).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_daily_rollover() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let service = service_with_clock(clock.clone());

        let created = service.generate(&owner(), RateTier::Free).await.unwrap();
        let first = service.validate(&created.secret).await.unwrap().unwrap();
        assert_eq!(first.requests_today(), 1);

        clock.advance(Duration::hours(1));
        let second = service.validate(&created.secret).await.unwrap().unwrap();

        assert_eq!(second.requests_today(), 1);
        assert_eq!(second.usage_count(), 2);
        assert_eq!(second.last_reset(), (start + Duration::hours(1)).date_naive());
    }

    #[tokio::test]
    async fn test_list_by_owner_is_masked() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Free).await.unwrap();
        service
            .generate(&PrincipalId::new("user-002").unwrap(), RateTier::Free)
            .await
            .unwrap();

        let keys = service.list_by_owner(&owner()).await.unwrap();
        assert_eq!(keys.len(), 1);

        let json = serde_json::to_string(&keys).unwrap();
        assert!(!json.contains(&created.secret));
        assert!(json.contains(&created.secret[..15]));
    }

    #[tokio::test]
    async fn test_tier_of() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Enterprise).await.unwrap();

        assert_eq!(service.tier_of(&created.secret).await.unwrap(), RateTier::Enterprise);
        assert_eq!(service.tier_of("pmp_nope").await.unwrap(), RateTier::Free);

        let service = service.with_unknown_key_tier(RateTier::Basic);
        assert_eq!(service.tier_of("pmp_nope").await.unwrap(), RateTier::Basic);
    }

    #[tokio::test]
    async fn test_lookup_does_not_count_usage() {
        let service = service();
        let created = service.generate(&owner(), RateTier::Free).await.unwrap();

        let record = service.lookup(&created.secret).await.unwrap().unwrap();
        assert_eq!(record.usage_count(), 0);
        assert_eq!(service.count().await.unwrap(), 1);
    }
}
