//! Pagination module
//!
//! Listing endpoints return a [`Page`] carrying its own position in the
//! listing. Sibling pages are fetched with `{base_path}/{index}[?{query}]`.
//!
//! # Overview
//!
//! - [`Page::fetch_next`] / [`Page::fetch_previous`] step one page at a time
//!   and return `None` without a request at either end.
//! - [`Pager`] turns a listing into lazy page and document streams.

mod pager;
mod types;

pub use pager::{DocStream, PageStream, Pager};
pub use types::{page_url, Page, PageType};
