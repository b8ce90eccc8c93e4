//! CLI module
//!
//! Command-line interface for browsing BeatSaver.
//!
//! # Commands
//!
//! - `list` - Show a built-in listing, one page or all of it
//! - `search` - Text or advanced search
//! - `map` / `hash` - Look up a single map
//! - `user` - Look up a user and optionally their uploads

mod commands;
mod runner;

pub use commands::{Cli, Commands, ListingKind, OutputFormat};
pub use runner::{page_summary, render_map, render_user, Runner};
