//! Authentication pipeline types

mod context;
mod error;

pub use context::{Admission, AuthContext, CredentialKind, Credentials};
pub use error::AuthError;
