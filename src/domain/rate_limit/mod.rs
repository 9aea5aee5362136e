//! Rate limiting domain
//!
//! Tier definitions and the decision types produced by the sliding-window limiter.

mod decision;
mod tier;

pub use decision::{DenialReason, LimitType, RateLimitDecision, RateLimitDenial, RateLimitStatus};
pub use tier::{RateTier, TierLimits, TierTable};
