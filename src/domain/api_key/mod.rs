//! API key domain
//!
//! Records for issued keys and the storage trait behind the key registry.

mod entity;
mod repository;

pub use entity::{mask_secret, ApiKeyRecord};
pub use repository::ApiKeyRepository;
