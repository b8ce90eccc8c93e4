//! Rate limit metadata
//!
//! BeatSaver reports its quota through `Rate-Limit-*` headers. The reset
//! header is a Unix timestamp in seconds; `Retry-After` (delta seconds) is
//! honoured when the reset header is missing.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Header carrying the request quota for the current window
pub const RATE_LIMIT_TOTAL: &str = "rate-limit-total";
/// Header carrying the requests left in the current window
pub const RATE_LIMIT_REMAINING: &str = "rate-limit-remaining";
/// Header carrying the window reset as Unix seconds
pub const RATE_LIMIT_RESET: &str = "rate-limit-reset";

/// Quota state reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window resets
    pub reset: DateTime<Utc>,
}

impl RateLimitInfo {
    /// Parse rate limit headers, filling gaps relative to `now`
    ///
    /// Missing counters become `0`. A missing reset falls back to
    /// `now + Retry-After`, then to `now`.
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        let reset = header_i64(headers, RATE_LIMIT_RESET)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                header_i64(headers, RETRY_AFTER.as_str())
                    .and_then(|secs| chrono::Duration::try_seconds(secs.max(0)))
                    .and_then(|delta| now.checked_add_signed(delta))
            })
            .unwrap_or(now);

        Self {
            limit: header_u32(headers, RATE_LIMIT_TOTAL).unwrap_or(0),
            remaining: header_u32(headers, RATE_LIMIT_REMAINING).unwrap_or(0),
            reset,
        }
    }

    /// Parse rate limit headers only if the server sent any
    pub fn try_from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Self> {
        let present = [RATE_LIMIT_TOTAL, RATE_LIMIT_REMAINING, RATE_LIMIT_RESET]
            .iter()
            .any(|name| headers.contains_key(*name));
        present.then(|| Self::from_headers(headers, now))
    }

    /// Time left until the window resets, clamped at zero
    pub fn delay_until_reset(&self, now: DateTime<Utc>) -> Duration {
        (self.reset - now).to_std().unwrap_or(Duration::ZERO)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    header_str(headers, name).and_then(|s| s.parse().ok())
}

fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    header_str(headers, name).and_then(|s| s.parse().ok())
}
