//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository};
use crate::domain::principal::PrincipalId;
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository
///
/// The map lock is only held to find or insert an entry; usage updates take the
/// per-record mutex so distinct keys never contend.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    records: RwLock<HashMap<String, Arc<Mutex<ApiKeyRecord>>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, lookup_id: &str) -> Option<Arc<Mutex<ApiKeyRecord>>> {
        self.records.read().await.get(lookup_id).cloned()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let lookup_id = record.lookup_id().to_string();

        if records.contains_key(&lookup_id) {
            return Err(DomainError::conflict(format!(
                "API key with lookup id '{}' already exists",
                lookup_id
            )));
        }

        records.insert(lookup_id, Arc::new(Mutex::new(record)));
        Ok(())
    }

    async fn get(&self, lookup_id: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        match self.entry(lookup_id).await {
            Some(entry) => Ok(Some(entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn record_usage(
        &self,
        lookup_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRecord>, DomainError> {
        let Some(entry) = self.entry(lookup_id).await else {
            return Ok(None);
        };

        let mut record = entry.lock().await;
        if !record.is_active() {
            return Ok(None);
        }

        record.record_usage(now);
        Ok(Some(record.clone()))
    }

    async fn deactivate(&self, lookup_id: &str) -> Result<bool, DomainError> {
        let Some(entry) = self.entry(lookup_id).await else {
            return Ok(false);
        };

        entry.lock().await.deactivate();
        Ok(true)
    }

    async fn list_by_owner(&self, owner_id: &PrincipalId) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let entries: Vec<Arc<Mutex<ApiKeyRecord>>> =
            self.records.read().await.values().cloned().collect();

        let mut result = Vec::new();
        for entry in entries {
            let record = entry.lock().await;
            if record.owner_id() == owner_id {
                result.push(record.clone());
            }
        }

        result.sort_by_key(|r| r.created_at());
        Ok(result)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_limit::RateTier;
    use chrono::Duration;

    fn owner(id: &str) -> PrincipalId {
        PrincipalId::new(id).unwrap()
    }

    fn record(lookup_id: &str, owner_id: &str, now: DateTime<Utc>) -> ApiKeyRecord {
        ApiKeyRecord::new(
            lookup_id,
            "sha256$salt$digest",
            "preview",
            owner(owner_id),
            RateTier::Basic,
            now,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryApiKeyRepository::new();
        let now = Utc::now();

        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();

        let found = repo.get("pmp_aaaaaaaa").await.unwrap().unwrap();
        assert_eq!(found.owner_id().as_str(), "user-001");
        assert!(repo.get("pmp_missing0").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let repo = InMemoryApiKeyRepository::new();
        let now = Utc::now();

        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();
        let result = repo.insert(record("pmp_aaaaaaaa", "user-002", now)).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_record_usage() {
        let repo = InMemoryApiKeyRepository::new();
        let now = Utc::now();
        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();

        repo.record_usage("pmp_aaaaaaaa", now).await.unwrap();
        let updated = repo.record_usage("pmp_aaaaaaaa", now).await.unwrap().unwrap();

        assert_eq!(updated.usage_count(), 2);
        assert_eq!(updated.requests_today(), 2);
        assert!(repo.record_usage("pmp_missing0", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_usage_skips_inactive() {
        let repo = InMemoryApiKeyRepository::new();
        let now = Utc::now();
        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();

        assert!(repo.deactivate("pmp_aaaaaaaa").await.unwrap());
        assert!(repo.record_usage("pmp_aaaaaaaa", now).await.unwrap().is_none());

        let stored = repo.get("pmp_aaaaaaaa").await.unwrap().unwrap();
        assert!(!stored.is_active());
        assert_eq!(stored.usage_count(), 0);
    }

    #[tokio::test]
    async fn test_deactivate_missing() {
        let repo = InMemoryApiKeyRepository::new();
        assert!(!repo.deactivate("pmp_missing0").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let repo = InMemoryApiKeyRepository::new();
        let now = Utc::now();

        repo.insert(record("pmp_bbbbbbbb", "user-001", now + Duration::seconds(1)))
            .await
            .unwrap();
        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();
        repo.insert(record("pmp_cccccccc", "user-002", now)).await.unwrap();

        let keys = repo.list_by_owner(&owner("user-001")).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].lookup_id(), "pmp_aaaaaaaa");
        assert_eq!(keys[1].lookup_id(), "pmp_bbbbbbbb");
    }

    #[tokio::test]
    async fn test_concurrent_usage_is_serialized() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());
        let now = Utc::now();
        repo.insert(record("pmp_aaaaaaaa", "user-001", now)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.record_usage("pmp_aaaaaaaa", now).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = repo.get("pmp_aaaaaaaa").await.unwrap().unwrap();
        assert_eq!(stored.usage_count(), 50);
    }
}
