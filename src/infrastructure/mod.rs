//! Infrastructure layer - Stores, services and the admission pipeline

pub mod api_key;
pub mod auth;
pub mod gateway;
pub mod logging;
pub mod observability;
pub mod principal;
pub mod rate_limit;
