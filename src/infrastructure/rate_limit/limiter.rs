//! Sliding window rate limiter with cooldown
//!
//! Each identifier keeps the timestamps of its allowed requests over the trailing hour.
//! Crossing the per-minute or per-hour limit blocks the identifier outright for one
//! minute or one hour respectively, regardless of window contents.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::rate_limit::{
    DenialReason, LimitType, RateLimitDecision, RateLimitDenial, RateLimitStatus, RateTier,
    TierLimits, TierTable,
};

const MINUTE_BLOCK_SECONDS: u64 = 60;
const HOUR_BLOCK_SECONDS: u64 = 3_600;

/// Per-identifier window
#[derive(Debug, Default)]
struct WindowState {
    /// Allowed request instants within the trailing hour
    timestamps: Vec<DateTime<Utc>>,
    blocked_until: Option<DateTime<Utc>>,
}

/// Snapshot of limiter occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimiterStats {
    pub total_identifiers: usize,
    pub blocked_identifiers: usize,
}

/// Rate limiter for all callers of the gateway
#[derive(Debug)]
pub struct RateLimiter {
    tiers: TierTable,
    windows: RwLock<HashMap<String, Arc<Mutex<WindowState>>>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(tiers: TierTable) -> Self {
        Self {
            tiers,
            windows: RwLock::new(HashMap::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create with a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Check a request for `identifier` and record it if allowed
    ///
    /// Calls for the same identifier are serialized; distinct identifiers never wait on
    /// each other beyond the brief map lookup.
    pub async fn check(&self, identifier: &str, tier: RateTier) -> RateLimitDecision {
        let window = self.window(identifier).await;
        let mut state = window.lock().await;
        let limits = self.tiers.limits_for(tier);

        let decision = evaluate(&mut state, limits, self.clock.now());

        if let RateLimitDecision::Denied(denial) = &decision {
            match denial.limit_type {
                Some(limit_type) => warn!(
                    identifier = %identifier,
                    tier = %tier,
                    limit_type = %limit_type,
                    current = denial.current.unwrap_or_default(),
                    limit = denial.limit.unwrap_or_default(),
                    "Rate limit exceeded, identifier blocked"
                ),
                None => debug!(
                    identifier = %identifier,
                    retry_after = denial.retry_after,
                    "Request from blocked identifier"
                ),
            }
        }

        decision
    }

    /// Forget all state for an identifier
    pub async fn reset(&self, identifier: &str) {
        self.windows.write().await.remove(identifier);
    }

    /// Count tracked and currently blocked identifiers
    pub async fn stats(&self) -> RateLimiterStats {
        let windows: Vec<Arc<Mutex<WindowState>>> =
            self.windows.read().await.values().cloned().collect();
        let now = self.clock.now();

        let mut blocked_identifiers = 0;
        for window in &windows {
            if window
                .lock()
                .await
                .blocked_until
                .is_some_and(|until| now < until)
            {
                blocked_identifiers += 1;
            }
        }

        RateLimiterStats {
            total_identifiers: windows.len(),
            blocked_identifiers,
        }
    }

    async fn window(&self, identifier: &str) -> Arc<Mutex<WindowState>> {
        if let Some(window) = self.windows.read().await.get(identifier) {
            return window.clone();
        }

        self.windows
            .write()
            .await
            .entry(identifier.to_string())
            .or_default()
            .clone()
    }
}

/// One check-and-update step of the window state machine
fn evaluate(state: &mut WindowState, limits: TierLimits, now: DateTime<Utc>) -> RateLimitDecision {
    if let Some(until) = state.blocked_until {
        if now < until {
            return RateLimitDecision::Denied(RateLimitDenial {
                reason: DenialReason::TemporarilyBlocked,
                limit_type: None,
                retry_after: ceil_seconds(until - now),
                reset_at: until,
                current: None,
                limit: None,
            });
        }
        state.blocked_until = None;
    }

    let hour_ago = now - Duration::hours(1);
    let minute_ago = now - Duration::minutes(1);

    state.timestamps.retain(|t| *t > hour_ago);

    let per_hour = state.timestamps.len() as u32;
    let per_minute = state.timestamps.iter().filter(|t| **t > minute_ago).count() as u32;

    // Minute first: it wins when both thresholds are crossed
    if per_minute >= limits.requests_per_minute {
        return block(
            state,
            now,
            LimitType::PerMinute,
            MINUTE_BLOCK_SECONDS,
            per_minute,
            limits.requests_per_minute,
        );
    }

    if per_hour >= limits.requests_per_hour {
        return block(
            state,
            now,
            LimitType::PerHour,
            HOUR_BLOCK_SECONDS,
            per_hour,
            limits.requests_per_hour,
        );
    }

    state.timestamps.push(now);

    RateLimitDecision::Allowed(RateLimitStatus {
        limit_per_minute: limits.requests_per_minute,
        remaining_minute: limits.requests_per_minute - per_minute - 1,
        limit_per_hour: limits.requests_per_hour,
        remaining_hour: limits.requests_per_hour - per_hour - 1,
    })
}

fn block(
    state: &mut WindowState,
    now: DateTime<Utc>,
    limit_type: LimitType,
    seconds: u64,
    current: u32,
    limit: u32,
) -> RateLimitDecision {
    let until = now + Duration::seconds(seconds as i64);
    state.blocked_until = Some(until);

    RateLimitDecision::Denied(RateLimitDenial {
        reason: DenialReason::RateLimitExceeded,
        limit_type: Some(limit_type),
        retry_after: seconds,
        reset_at: until,
        current: Some(current),
        limit: Some(limit),
    })
}

/// Whole seconds, rounded up, never below one
fn ceil_seconds(remaining: Duration) -> u64 {
    let millis = remaining.num_milliseconds().max(0) as u64;
    millis.div_ceil(1_000).max(1)
}
