//! Request admission: credential resolution, rate limiting, authorization

mod pipeline;
mod resolver;

pub use pipeline::{AccessRequirement, AuthPipeline, RequestHandler};
pub use resolver::CredentialResolver;
