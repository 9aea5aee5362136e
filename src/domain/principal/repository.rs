//! Principal store trait

use async_trait::async_trait;

use super::entity::{Principal, PrincipalId};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read-only source of principals
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Finds a principal by ID
    async fn get(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError>;

    /// Finds a principal by login name
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, DomainError>;
}
