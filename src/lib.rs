// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # BeatSaver Client
//!
//! Async client for the BeatSaver map-sharing API.
//!
//! ## Features
//!
//! - **Typed Endpoints**: Listings, search, map and user lookups
//! - **Rate Limit Handling**: Sleeps until the server's reset time on HTTP 429
//! - **Cursor Pagination**: Step between pages or stream every document lazily
//! - **Cancellation & Progress**: Per-call `CancellationToken` and progress sink
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beatsaver_client::{BeatSaver, ClientOptions, Result};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = BeatSaver::new(ClientOptions::new("MapBrowser", "1.0.0"))?;
//!
//!     // One page at a time
//!     let page = client.latest(0).await?;
//!     if let Some(next) = page.fetch_next().await? {
//!         println!("{} more maps", next.docs.len());
//!     }
//!
//!     // Or everything, fetched only as it is consumed
//!     let mut docs = client.listing(beatsaver_client::PageType::Hot).docs();
//!     while let Some(map) = docs.try_next().await? {
//!         println!("{} ({})", map.name, map.key);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  BeatSaver: latest/hot/search/beatmap_by_key/user ...    │
//! └──────────────────────────────────────────────────────────┘
//!            │                              │
//! ┌──────────┴──────────┐        ┌──────────┴──────────────┐
//! │  Page / Pager       │        │  User                   │
//! │  fetch_next/prev    │        │  beatmaps(page)         │
//! │  pages() / docs()   │        │  beatmaps_pager()       │
//! └──────────┬──────────┘        └──────────┬──────────────┘
//!            └──────────────┬───────────────┘
//! ┌─────────────────────────┴────────────────────────────────┐
//! │  HttpClient: User-Agent, 429 retry, cancel, progress     │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Client configuration
pub mod config;

/// HTTP executor with rate limit handling
pub mod http;

/// Pages and lazy listing streams
pub mod pagination;

/// API resources
pub mod models;

/// Service handle and endpoints
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::BeatSaver;
pub use config::{Agent, ClientOptions, HttpVersion};
pub use error::{Error, Result};
pub use http::{FetchOptions, ProgressSink, RateLimitInfo};
pub use models::{Beatmap, User};
pub use pagination::{Page, PageType, Pager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
