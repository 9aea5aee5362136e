//! API key record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::principal::PrincipalId;
use crate::domain::rate_limit::RateTier;

const PREVIEW_HEAD: usize = 15;
const PREVIEW_TAIL: usize = 4;

/// Masked form of a secret: first 15 characters, `...`, last 4 characters
///
/// Secrets too short to mask without overlap are fully hidden.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= PREVIEW_HEAD + PREVIEW_TAIL {
        return "...".to_string();
    }

    let head: String = chars[..PREVIEW_HEAD].iter().collect();
    let tail: String = chars[chars.len() - PREVIEW_TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Stored state of one issued API key
///
/// The plaintext secret is never held; only its salted hash and a masked preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Non-secret index (type prefix + first random characters)
    lookup_id: String,
    #[serde(skip_serializing, default)]
    secret_hash: String,
    preview: String,
    owner_id: PrincipalId,
    tier: RateTier,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    active: bool,
    usage_count: u64,
    requests_today: u64,
    /// UTC date the daily counter was last reset
    last_reset: NaiveDate,
}

impl ApiKeyRecord {
    /// Fresh active record with zeroed counters
    pub fn new(
        lookup_id: impl Into<String>,
        secret_hash: impl Into<String>,
        preview: impl Into<String>,
        owner_id: PrincipalId,
        tier: RateTier,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            lookup_id: lookup_id.into(),
            secret_hash: secret_hash.into(),
            preview: preview.into(),
            owner_id,
            tier,
            created_at: now,
            last_used_at: None,
            active: true,
            usage_count: 0,
            requests_today: 0,
            last_reset: now.date_naive(),
        }
    }

    // Getters

    pub fn lookup_id(&self) -> &str {
        &self.lookup_id
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn owner_id(&self) -> &PrincipalId {
        &self.owner_id
    }

    pub fn tier(&self) -> RateTier {
        self.tier
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn requests_today(&self) -> u64 {
        self.requests_today
    }

    pub fn last_reset(&self) -> NaiveDate {
        self.last_reset
    }

    // Mutations

    /// Count one validated use, rolling the daily counter over on a new UTC date
    pub fn record_usage(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if self.last_reset != today {
            self.requests_today = 0;
            self.last_reset = today;
        }

        self.last_used_at = Some(now);
        self.usage_count += 1;
        self.requests_today += 1;
    }

    /// Soft-delete; a deactivated record never becomes active again
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
