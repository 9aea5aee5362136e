//! Domain layer - Core gateway types, traits and decision inputs

pub mod api_key;
pub mod auth;
pub mod clock;
pub mod error;
pub mod principal;
pub mod rate_limit;
pub mod token;

pub use api_key::{mask_secret, ApiKeyRecord, ApiKeyRepository};
pub use auth::{Admission, AuthContext, AuthError, CredentialKind, Credentials};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::DomainError;
pub use principal::{Principal, PrincipalId, PrincipalStore, Role};
pub use rate_limit::{
    DenialReason, LimitType, RateLimitDecision, RateLimitDenial, RateLimitStatus, RateTier,
    TierLimits, TierTable,
};
pub use token::{IssuedToken, TokenClaims};
