//! Lazy traversal of a whole listing

use super::types::Page;
use crate::client::BeatSaver;
use crate::error::{Error, Result};
use crate::http::FetchOptions;
use crate::models::Beatmap;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

/// Stream of pages, fetched on demand
pub type PageStream = BoxStream<'static, Result<Page>>;

/// Stream of documents across every page, fetched on demand
pub type DocStream = BoxStream<'static, Result<Beatmap>>;

/// A listing that can be walked from its first page
///
/// Streams produced by [`Pager::pages`] and [`Pager::docs`] only request a
/// page when polled past the end of the previous one, and stop after the
/// first error. Calling either method again restarts from the first page,
/// which is page 0 unless set with [`Pager::starting_at`].
#[derive(Debug, Clone)]
pub struct Pager {
    client: BeatSaver,
    base_path: String,
    query: Option<String>,
    start: u32,
    options: FetchOptions,
}

/// Where a page stream stands between polls
enum Cursor {
    Start,
    After(Page),
}

impl Pager {
    /// Create a pager for a listing base path
    pub fn new(client: BeatSaver, base_path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            client,
            base_path: base_path.into(),
            query,
            start: 0,
            options: FetchOptions::default(),
        }
    }

    /// Use these options for every page request
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Begin traversals at this page index
    #[must_use]
    pub fn starting_at(mut self, index: u32) -> Self {
        self.start = index;
        self
    }

    /// Listing base path
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Query string sent with every page
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Fetch a single page by index
    pub async fn page(&self, index: u32) -> Result<Page> {
        self.client
            .fetch_page(
                &self.base_path,
                index,
                self.query.as_deref(),
                self.options.clone(),
            )
            .await
    }

    /// Lazily fetch every page from the first page on
    pub fn pages(&self) -> PageStream {
        let pager = self.clone();
        stream::try_unfold(Cursor::Start, move |cursor| {
            let pager = pager.clone();
            async move {
                let page = match cursor {
                    Cursor::Start => pager.page(pager.start).await?,
                    Cursor::After(previous) => {
                        match previous.fetch_next_with(pager.options.clone()).await? {
                            Some(page) => page,
                            None => return Ok(None),
                        }
                    }
                };

                let cursor = Cursor::After(page.without_docs());
                Ok::<_, Error>(Some((page, cursor)))
            }
        })
        .boxed()
    }

    /// Lazily fetch every document from the first page on
    pub fn docs(&self) -> DocStream {
        self.pages()
            .map_ok(|page| stream::iter(page.docs.into_iter().map(Ok::<_, Error>)))
            .try_flatten()
            .boxed()
    }
}
