//! Rate tiers and their quota table

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Named rate-limit class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    /// Lowest privilege tier, also used for unknown keys
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl RateTier {
    /// Every tier, lowest first
    pub const ALL: [RateTier; 4] = [Self::Free, Self::Basic, Self::Premium, Self::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for RateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RateTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(DomainError::validation(format!(
                "Unknown rate tier '{}'. Expected one of: free, basic, premium, enterprise",
                other
            ))),
        }
    }
}

/// Quota pair for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum requests in any trailing minute
    pub requests_per_minute: u32,
    /// Maximum requests in any trailing hour
    pub requests_per_hour: u32,
}

impl TierLimits {
    pub const fn new(requests_per_minute: u32, requests_per_hour: u32) -> Self {
        Self {
            requests_per_minute,
            requests_per_hour,
        }
    }
}

/// Tier to quota mapping, loaded once at start-up
///
/// Tiers missing from configuration keep their default limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub free: TierLimits,
    pub basic: TierLimits,
    pub premium: TierLimits,
    pub enterprise: TierLimits,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            free: TierLimits::new(10, 100),
            basic: TierLimits::new(60, 1_000),
            premium: TierLimits::new(300, 10_000),
            enterprise: TierLimits::new(1_000, 50_000),
        }
    }
}

impl TierTable {
    /// Limits for a tier
    pub fn limits_for(&self, tier: RateTier) -> TierLimits {
        match tier {
            RateTier::Free => self.free,
            RateTier::Basic => self.basic,
            RateTier::Premium => self.premium,
            RateTier::Enterprise => self.enterprise,
        }
    }

    /// Override the limits of one tier
    pub fn with_limits(mut self, tier: RateTier, limits: TierLimits) -> Self {
        match tier {
            RateTier::Free => self.free = limits,
            RateTier::Basic => self.basic = limits,
            RateTier::Premium => self.premium = limits,
            RateTier::Enterprise => self.enterprise = limits,
        }
        self
    }

    /// Iterate tiers with their limits, lowest tier first
    pub fn iter(&self) -> impl Iterator<Item = (RateTier, TierLimits)> + '_ {
        RateTier::ALL.into_iter().map(|tier| (tier, self.limits_for(tier)))
    }

    /// Reject tables that would deny every request or can never reach the minute limit
    pub fn validate(&self) -> Result<(), DomainError> {
        for (tier, limits) in self.iter() {
            if limits.requests_per_minute == 0 || limits.requests_per_hour == 0 {
                return Err(DomainError::configuration(format!(
                    "{} tier limits must be non-zero",
                    tier
                )));
            }

            if limits.requests_per_minute > limits.requests_per_hour {
                return Err(DomainError::configuration(format!(
                    "{} tier allows more requests per minute ({}) than per hour ({})",
                    tier, limits.requests_per_minute, limits.requests_per_hour
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = TierTable::default();

        assert_eq!(table.limits_for(RateTier::Free), TierLimits::new(10, 100));
        assert_eq!(table.limits_for(RateTier::Basic), TierLimits::new(60, 1_000));
        assert_eq!(table.limits_for(RateTier::Premium), TierLimits::new(300, 10_000));
        assert_eq!(
            table.limits_for(RateTier::Enterprise),
            TierLimits::new(1_000, 50_000)
        );
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_tier_parse_and_display() {
        assert_eq!("premium".parse::<RateTier>().unwrap(), RateTier::Premium);
        assert_eq!(" Enterprise ".parse::<RateTier>().unwrap(), RateTier::Enterprise);
        assert!("platinum".parse::<RateTier>().is_err());
        assert_eq!(RateTier::Basic.to_string(), "basic");
    }

    #[test]
    fn test_default_tier_is_lowest() {
        assert_eq!(RateTier::default(), RateTier::Free);
        assert_eq!(RateTier::ALL[0], RateTier::Free);
    }

    #[test]
    fn test_with_limits_override() {
        let table = TierTable::default().with_limits(RateTier::Free, TierLimits::new(3, 30));
        assert_eq!(table.limits_for(RateTier::Free), TierLimits::new(3, 30));
        assert_eq!(table.limits_for(RateTier::Basic), TierLimits::new(60, 1_000));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let table = TierTable::default().with_limits(RateTier::Premium, TierLimits::new(0, 10));
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_minute_above_hour() {
        let table = TierTable::default().with_limits(RateTier::Basic, TierLimits::new(50, 20));
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&RateTier::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");

        let tier: RateTier = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(tier, RateTier::Basic);
    }
}
