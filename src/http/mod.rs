//! HTTP client module
//!
//! Provides the request executor every endpoint goes through.
//!
//! # Features
//!
//! - **Rate Limiting**: Sleeps until the server's reset time on HTTP 429
//! - **Cancellation**: `CancellationToken` checked around every await
//! - **Progress**: Fractional progress reported per 8 KiB body chunk

mod client;
mod rate_limit;
mod request;

pub use client::{HttpClient, CHUNK_SIZE};
pub use rate_limit::{RateLimitInfo, RATE_LIMIT_REMAINING, RATE_LIMIT_RESET, RATE_LIMIT_TOTAL};
pub use request::{FetchOptions, ProgressSink, Request, Response};

#[cfg(test)]
mod tests;
