//! Bearer token domain

mod claims;

pub use claims::{IssuedToken, TokenClaims};
