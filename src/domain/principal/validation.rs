//! Principal identifier validation

use thiserror::Error;

/// Errors that can occur during principal id validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrincipalValidationError {
    #[error("Principal ID cannot be empty")]
    EmptyId,

    #[error("Principal ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Principal ID must start with a letter or number")]
    InvalidStart,

    #[error("Principal ID contains invalid character: '{0}'. Only alphanumeric characters, hyphens, underscores, dots and '@' are allowed")]
    InvalidCharacter(char),
}

const MAX_PRINCIPAL_ID_LENGTH: usize = 128;

/// Validate a principal ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 128 characters
/// - Must start with an alphanumeric character
/// - Only alphanumerics, `-`, `_`, `.` and `@` (identity-provider subjects are often emails)
pub fn validate_principal_id(id: &str) -> Result<(), PrincipalValidationError> {
    if id.is_empty() {
        return Err(PrincipalValidationError::EmptyId);
    }

    if id.len() > MAX_PRINCIPAL_ID_LENGTH {
        return Err(PrincipalValidationError::TooLong(MAX_PRINCIPAL_ID_LENGTH));
    }

    let mut chars = id.chars();

    if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(PrincipalValidationError::InvalidStart);
    }

    for c in id.chars() {
        if !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@')) {
            return Err(PrincipalValidationError::InvalidCharacter(c));
        }
    }

    Ok(())
}
