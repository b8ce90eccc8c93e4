//! Page of listing results and its sibling navigation

use crate::client::BeatSaver;
use crate::error::{Error, Result};
use crate::http::FetchOptions;
use crate::models::Beatmap;
use serde::{Deserialize, Serialize};

/// Built-in map listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    /// Newest uploads first
    Latest,
    /// Trending maps
    Hot,
    /// Highest rated
    Rating,
    /// Most downloaded
    Downloads,
    /// Most played
    Plays,
}

impl PageType {
    /// Every listing type
    pub const ALL: [PageType; 5] = [
        PageType::Latest,
        PageType::Hot,
        PageType::Rating,
        PageType::Downloads,
        PageType::Plays,
    ];

    /// Path segment used by the API
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Latest => "latest",
            PageType::Hot => "hot",
            PageType::Rating => "rating",
            PageType::Downloads => "downloads",
            PageType::Plays => "plays",
        }
    }

    /// Listing base path, without the page index
    pub fn base_path(self) -> String {
        format!("maps/{}", self.as_str())
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PageType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::config(format!("Unknown listing type: {s}")))
    }
}

/// Build the path for one page of a listing
///
/// `{base_path}/{index}` with `?{query}` appended when a query is present.
pub fn page_url(base_path: &str, index: u32, query: Option<&str>) -> String {
    let base_path = base_path.trim_end_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base_path}/{index}?{query}"),
        None => format!("{base_path}/{index}"),
    }
}

/// One page of a paginated listing
///
/// Besides the wire fields, a page remembers where it came from so that
/// [`Page::fetch_next`] and [`Page::fetch_previous`] can walk the listing in
/// either direction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Documents on this page
    #[serde(default)]
    pub docs: Vec<Beatmap>,

    /// Total documents across the whole listing
    #[serde(default)]
    pub total_docs: u64,

    /// Index of the last page
    #[serde(default)]
    pub last_page: u32,

    /// Index of the previous page, if any
    #[serde(default)]
    pub prev_page: Option<u32>,

    /// Index of the next page, if any
    #[serde(default)]
    pub next_page: Option<u32>,

    #[serde(skip)]
    base_path: String,

    #[serde(skip)]
    query: Option<String>,

    #[serde(skip)]
    client: Option<BeatSaver>,
}

impl Page {
    /// Listing path this page belongs to
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Query string carried to sibling pages
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }

    /// Whether a previous page exists
    pub fn has_previous(&self) -> bool {
        self.prev_page.is_some()
    }

    /// Fetch the previous page, or `None` on the first page
    pub async fn fetch_previous(&self) -> Result<Option<Page>> {
        self.fetch_previous_with(FetchOptions::default()).await
    }

    /// Fetch the previous page with cancellation and progress options
    pub async fn fetch_previous_with(&self, options: FetchOptions) -> Result<Option<Page>> {
        self.fetch_sibling(self.prev_page, options).await
    }

    /// Fetch the next page, or `None` on the last page
    pub async fn fetch_next(&self) -> Result<Option<Page>> {
        self.fetch_next_with(FetchOptions::default()).await
    }

    /// Fetch the next page with cancellation and progress options
    pub async fn fetch_next_with(&self, options: FetchOptions) -> Result<Option<Page>> {
        self.fetch_sibling(self.next_page, options).await
    }

    async fn fetch_sibling(&self, index: Option<u32>, options: FetchOptions) -> Result<Option<Page>> {
        let Some(index) = index else {
            return Ok(None);
        };

        let client = self.client.as_ref().ok_or(Error::Detached { kind: "Page" })?;
        let page = client
            .fetch_page(&self.base_path, index, self.query.as_deref(), options)
            .await?;
        Ok(Some(page))
    }

    /// Copy of the navigation state with no documents
    pub(crate) fn without_docs(&self) -> Page {
        Page {
            docs: Vec::new(),
            total_docs: self.total_docs,
            last_page: self.last_page,
            prev_page: self.prev_page,
            next_page: self.next_page,
            base_path: self.base_path.clone(),
            query: self.query.clone(),
            client: self.client.clone(),
        }
    }

    /// Bind a freshly decoded page to its listing and client
    pub(crate) fn attach(&mut self, client: &BeatSaver, base_path: &str, query: Option<&str>) {
        self.base_path = base_path.to_string();
        self.query = query.map(str::to_string);
        self.client = Some(client.clone());

        for uploader in self.docs.iter_mut().filter_map(|doc| doc.uploader.as_mut()) {
            uploader.attach(client);
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("docs", &self.docs.len())
            .field("total_docs", &self.total_docs)
            .field("last_page", &self.last_page)
            .field("prev_page", &self.prev_page)
            .field("next_page", &self.next_page)
            .field("base_path", &self.base_path)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
