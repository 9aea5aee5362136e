//! Principal entity and related types

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::permissions::default_permissions;
use super::validation::{validate_principal_id, PrincipalValidationError};
use crate::domain::DomainError;

/// Principal identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create a new PrincipalId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, PrincipalValidationError> {
        let id = id.into();
        validate_principal_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = PrincipalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrincipalId> for String {
    fn from(id: PrincipalId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Bypasses permission and resource-scope checks
    Admin,
    Architect,
    #[default]
    Developer,
    Viewer,
    Auditor,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Self::Admin,
        Self::Architect,
        Self::Developer,
        Self::Viewer,
        Self::Auditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Architect => "architect",
            Self::Developer => "developer",
            Self::Viewer => "viewer",
            Self::Auditor => "auditor",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "architect" => Ok(Self::Architect),
            "developer" => Ok(Self::Developer),
            "viewer" => Ok(Self::Viewer),
            "auditor" => Ok(Self::Auditor),
            other => Err(DomainError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// Authenticated identity a request acts on behalf of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    role: Role,
    active: bool,
    permissions: HashSet<String>,
    /// Resource scopes (e.g. account ids) this principal may touch
    resource_scopes: HashSet<String>,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: Option<String>,
}

impl Principal {
    /// Create an active principal carrying the role's default permissions
    pub fn new(id: PrincipalId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            role,
            active: true,
            permissions: default_permissions(role)
                .iter()
                .map(|p| p.to_string())
                .collect(),
            resource_scopes: HashSet::new(),
            password_hash: None,
        }
    }

    /// Set email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Replace the permission set
    pub fn with_permissions(
        mut self,
        permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the allowed resource scopes
    pub fn with_resource_scopes(
        mut self,
        scopes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.resource_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the password hash
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Set active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    // Getters

    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn permissions(&self) -> &HashSet<String> {
        &self.permissions
    }

    pub fn resource_scopes(&self) -> &HashSet<String> {
        &self.resource_scopes
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    /// Sorted permission list, used when embedding permissions in token claims
    pub fn sorted_permissions(&self) -> Vec<String> {
        let mut perms: Vec<String> = self.permissions.iter().cloned().collect();
        perms.sort();
        perms
    }
}
