//! Tiers command - prints the effective tier table after configuration layering

use anyhow::Context;
use clap::Args;

use crate::config::{AppConfig, RateLimitsConfig};

#[derive(Debug, Args)]
pub struct TiersArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TiersArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.rate_limits.tiers.validate()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config.rate_limits.tiers)?);
    } else {
        print!("{}", render_table(&config.rate_limits));
    }

    Ok(())
}

fn render_table(rate_limits: &RateLimitsConfig) -> String {
    let mut out = format!("{:<12} {:>10} {:>10}\n", "TIER", "PER MIN", "PER HOUR");

    for (tier, limits) in rate_limits.tiers.iter() {
        let marker = match (
            tier == rate_limits.bearer_tier,
            tier == rate_limits.unknown_key_tier,
        ) {
            (true, true) => "  (bearer, unknown keys)",
            (true, false) => "  (bearer)",
            (false, true) => "  (unknown keys)",
            (false, false) => "",
        };

        out.push_str(&format!(
            "{:<12} {:>10} {:>10}{}\n",
            tier.as_str(),
            limits.requests_per_minute,
            limits.requests_per_hour,
            marker
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_table() {
        let table = render_table(&RateLimitsConfig::default());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("free"));
        assert!(lines[1].ends_with("(unknown keys)"));
        assert!(lines[2].contains("60"));
        assert!(lines[2].ends_with("(bearer)"));
        assert!(lines[4].contains("50000"));
    }
}
