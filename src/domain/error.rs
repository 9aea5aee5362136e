use thiserror::Error;

/// Core domain errors for management operations (key issuance, configuration, stores)
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Principal 'user-009' not found");
        assert_eq!(error.to_string(), "Not found: Principal 'user-009' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Unknown rate tier");
        assert_eq!(error.to_string(), "Validation error: Unknown rate tier");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("API key lookup id already exists");
        assert_eq!(error.to_string(), "Conflict: API key lookup id already exists");
    }

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("free tier limits must be non-zero");
        assert_eq!(
            error.to_string(),
            "Configuration error: free tier limits must be non-zero"
        );
    }
}
