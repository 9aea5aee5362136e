//! Role and permission checks against a resolved principal

use tracing::debug;

use crate::domain::auth::AuthError;
use crate::domain::principal::Principal;

/// Stateless permission evaluator; admins pass every check
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationChecker;

impl AuthorizationChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn has_permission(&self, principal: &Principal, permission: &str) -> bool {
        principal.role().is_admin() || principal.permissions().contains(permission)
    }

    pub fn has_resource_access(&self, principal: &Principal, resource_scope: &str) -> bool {
        principal.role().is_admin() || principal.resource_scopes().contains(resource_scope)
    }

    /// Fail with `Forbidden` naming the missing permission
    pub fn require_permission(
        &self,
        principal: &Principal,
        permission: &str,
    ) -> Result<(), AuthError> {
        if self.has_permission(principal, permission) {
            return Ok(());
        }

        debug!(principal_id = %principal.id(), permission, "Permission denied");
        Err(AuthError::forbidden(permission))
    }

    /// Fail with `Forbidden` naming the scope as `resource:<scope>`
    pub fn require_resource_access(
        &self,
        principal: &Principal,
        resource_scope: &str,
    ) -> Result<(), AuthError> {
        if self.has_resource_access(principal, resource_scope) {
            return Ok(());
        }

        debug!(principal_id = %principal.id(), resource_scope, "Resource access denied");
        Err(AuthError::forbidden(format!("resource:{}", resource_scope)))
    }
}
