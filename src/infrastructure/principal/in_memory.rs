//! In-memory principal store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::principal::{Principal, PrincipalId, PrincipalStore, Role};
use crate::domain::DomainError;
use crate::infrastructure::auth::PasswordHasher;

/// Demo logins: (id, username, password, role)
const DEMO_PRINCIPALS: &[(&str, &str, &str, Role)] = &[
    ("user-001", "admin", "admin123", Role::Admin),
    ("user-002", "architect", "architect123", Role::Architect),
    ("user-003", "developer", "developer123", Role::Developer),
];

const DEMO_EMAIL_DOMAIN: &str = "demo.local";

/// Principal store backed by a map, for single-process deployments and tests
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    principals: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the demo admin, architect and developer logins
    pub async fn with_demo_principals(hasher: &dyn PasswordHasher) -> Result<Self, DomainError> {
        let store = Self::new();

        for (id, username, password, role) in DEMO_PRINCIPALS {
            let id = PrincipalId::new(*id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
            let principal = Principal::new(id, *username, *role)
                .with_email(format!("{}@{}", username, DEMO_EMAIL_DOMAIN))
                .with_password_hash(hasher.hash(password)?);
            store.upsert(principal).await;
        }

        info!(count = DEMO_PRINCIPALS.len(), "Seeded demo principals");
        Ok(store)
    }

    /// Insert or replace a principal
    pub async fn upsert(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id().as_str().to_string(), principal);
    }

    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.principals.read().await.is_empty()
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn get(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        Ok(self.principals.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|p| p.username() == username)
            .cloned())
    }
}
