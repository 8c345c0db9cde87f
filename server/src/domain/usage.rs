//! Usage and cost model
//!
//! Converts provider token counts into USD. Prices are flat per thousand
//! tokens; there is no split between prompt and completion tokens.

use serde::{Deserialize, Serialize};

use crate::core::config::PricingConfig;
use crate::core::constants::CHARS_PER_TOKEN_ESTIMATE;

/// Provider consumption attributed to one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tokens: u64,
    #[serde(rename = "costUsd")]
    pub cost_usd: f64,
}

impl UsageRecord {
    /// Price a token count with the configured rate
    pub fn priced(tokens: u64, pricing: &PricingConfig) -> Self {
        Self {
            tokens,
            cost_usd: tokens_to_usd(tokens, pricing.usd_per_1k_tokens),
        }
    }
}

/// `tokens / 1000 * usd_per_1k`
pub fn tokens_to_usd(tokens: u64, usd_per_1k: f64) -> f64 {
    (tokens as f64 / 1000.0) * usd_per_1k
}

/// Rough token count for providers that report none: one token per four characters, rounded up
pub fn estimate_tokens(text: &str) -> u64 {
    text.chars().count().div_ceil(CHARS_PER_TOKEN_ESTIMATE) as u64
}
