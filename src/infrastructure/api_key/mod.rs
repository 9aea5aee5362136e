//! API key infrastructure
//!
//! Key generation and hashing, in-memory storage and the registry service.

mod generator;
mod repository;
mod service;

pub use generator::{ApiKeyGenerator, GeneratedApiKey};
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKeyResult};
