//! Principal domain
//!
//! Identities, roles and the default role permission table. Principals are owned by an
//! external store; the gateway only reads them.

mod entity;
pub mod permissions;
mod repository;
mod validation;

pub use entity::{Principal, PrincipalId, Role};
pub use permissions::default_permissions;
pub use repository::PrincipalStore;
#[cfg(test)]
pub use repository::MockPrincipalStore;
pub use validation::{validate_principal_id, PrincipalValidationError};
