//! API key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::ApiKeyRecord;
use crate::domain::principal::PrincipalId;
use crate::domain::DomainError;

/// Storage for API key records, keyed by lookup id
///
/// Implementations must serialize `record_usage` and `deactivate` per record.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Store a new record; fails with a conflict if the lookup id is taken
    async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError>;

    /// Get a record by lookup id
    async fn get(&self, lookup_id: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Apply [`ApiKeyRecord::record_usage`] if the record exists and is still active,
    /// returning the updated record
    async fn record_usage(
        &self,
        lookup_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Deactivate a record; returns whether it exists
    async fn deactivate(&self, lookup_id: &str) -> Result<bool, DomainError>;

    /// All records owned by a principal, oldest first
    async fn list_by_owner(&self, owner_id: &PrincipalId) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Number of stored records, active or not
    async fn count(&self) -> Result<usize, DomainError>;
}
