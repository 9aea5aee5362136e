//! Role to default permission table

use super::entity::Role;

/// Permission strings are `<resource>:<action>`
pub const ACCOUNT_CREATE: &str = "account:create";
pub const ACCOUNT_READ: &str = "account:read";
pub const ACCOUNT_UPDATE: &str = "account:update";
pub const ACCOUNT_DELETE: &str = "account:delete";
pub const USER_CREATE: &str = "user:create";
pub const USER_READ: &str = "user:read";
pub const USER_UPDATE: &str = "user:update";
pub const USER_DELETE: &str = "user:delete";
pub const DEPLOYMENT_CREATE: &str = "deployment:create";
pub const DEPLOYMENT_READ: &str = "deployment:read";
pub const DEPLOYMENT_UPDATE: &str = "deployment:update";
pub const DEPLOYMENT_DELETE: &str = "deployment:delete";
pub const POLICY_CREATE: &str = "policy:create";
pub const POLICY_READ: &str = "policy:read";
pub const POLICY_UPDATE: &str = "policy:update";
pub const POLICY_DELETE: &str = "policy:delete";
pub const AUDIT_READ: &str = "audit:read";
pub const COST_READ: &str = "cost:read";

/// Gate for the rate-limit statistics endpoint; no default role carries it, admins pass implicitly
pub const ADMIN_RATE_LIMITS: &str = "admin:rate_limits";

const ADMIN: &[&str] = &[
    ACCOUNT_CREATE,
    ACCOUNT_READ,
    ACCOUNT_UPDATE,
    ACCOUNT_DELETE,
    USER_CREATE,
    USER_READ,
    USER_UPDATE,
    USER_DELETE,
    DEPLOYMENT_CREATE,
    DEPLOYMENT_READ,
    DEPLOYMENT_UPDATE,
    DEPLOYMENT_DELETE,
    POLICY_CREATE,
    POLICY_READ,
    POLICY_UPDATE,
    POLICY_DELETE,
    AUDIT_READ,
    COST_READ,
];

const ARCHITECT: &[&str] = &[
    ACCOUNT_READ,
    ACCOUNT_UPDATE,
    DEPLOYMENT_CREATE,
    DEPLOYMENT_READ,
    DEPLOYMENT_UPDATE,
    POLICY_CREATE,
    POLICY_READ,
    POLICY_UPDATE,
    AUDIT_READ,
    COST_READ,
];

const DEVELOPER: &[&str] = &[
    ACCOUNT_READ,
    DEPLOYMENT_CREATE,
    DEPLOYMENT_READ,
    POLICY_READ,
    COST_READ,
];

const VIEWER: &[&str] = &[ACCOUNT_READ, DEPLOYMENT_READ, POLICY_READ, COST_READ];

const AUDITOR: &[&str] = &[
    ACCOUNT_READ,
    DEPLOYMENT_READ,
    POLICY_READ,
    AUDIT_READ,
    COST_READ,
];

/// Default permission set granted to a role
pub fn default_permissions(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => ADMIN,
        Role::Architect => ARCHITECT,
        Role::Developer => DEVELOPER,
        Role::Viewer => VIEWER,
        Role::Auditor => AUDITOR,
    }
}
