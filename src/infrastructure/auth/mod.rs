//! Authentication infrastructure
//!
//! Bearer tokens, password verification and permission checks.

mod authorization;
mod jwt;
mod password;

pub use authorization::AuthorizationChecker;
pub use jwt::{
    generate_secret, parse_hmac_algorithm, TokenConfig, TokenIssuer, TokenService,
    MAX_EXPIRATION_MINUTES,
};
pub use password::{Argon2Hasher, PasswordHasher};
