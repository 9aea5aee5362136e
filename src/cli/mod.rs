//! Command line entry points
//!
//! - `serve`: run the HTTP gateway (default)
//! - `tiers`: print the effective tier table

pub mod serve;
pub mod tiers;

use clap::{Parser, Subcommand};

/// PMP Auth Gateway - API key and bearer token authentication with tiered rate limits
#[derive(Debug, Parser)]
#[command(name = "pmp-auth-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve,

    /// Print the configured rate-limit tiers
    Tiers(tiers::TiersArgs),
}
