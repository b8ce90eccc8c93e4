//! BeatSaver service handle
//!
//! [`BeatSaver`] is cheap to clone; every clone shares one executor and
//! connection pool. Pages and users decoded through it keep a clone so they
//! can fetch further data.

use crate::config::ClientOptions;
use crate::error::Result;
use crate::http::{FetchOptions, HttpClient, Request};
use crate::models::{Beatmap, User};
use crate::pagination::{page_url, Page, PageType, Pager};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Client for the BeatSaver API
#[derive(Clone)]
pub struct BeatSaver {
    http: Arc<HttpClient>,
}

impl BeatSaver {
    /// Create a client from options
    pub fn new(options: ClientOptions) -> Result<Self> {
        Ok(Self::with_http_client(HttpClient::with_options(options)?))
    }

    /// Wrap an existing executor
    pub fn with_http_client(http: HttpClient) -> Self {
        Self {
            http: Arc::new(http),
        }
    }

    /// The shared executor
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Fetch one page of a listing and bind it for further navigation
    pub async fn fetch_page(
        &self,
        base_path: &str,
        page: u32,
        query: Option<&str>,
        options: FetchOptions,
    ) -> Result<Page> {
        let url = page_url(base_path, page, query);
        let response = self
            .http
            .execute(&Request::get(url).with_options(options))
            .await?
            .error_for_status()?;

        let mut decoded: Page = response.json()?;
        decoded.attach(self, base_path, query);
        debug!(
            "Fetched {base_path} page {page}: {} docs, next {:?}",
            decoded.docs.len(),
            decoded.next_page
        );
        Ok(decoded)
    }

    /// Fetch one page of a built-in listing
    pub async fn listing_page(
        &self,
        kind: PageType,
        page: u32,
        options: FetchOptions,
    ) -> Result<Page> {
        self.fetch_page(&kind.base_path(), page, None, options)
            .await
    }

    /// Pager over a built-in listing
    pub fn listing(&self, kind: PageType) -> Pager {
        Pager::new(self.clone(), kind.base_path(), None)
    }

    /// Newest maps
    pub async fn latest(&self, page: u32) -> Result<Page> {
        self.listing_page(PageType::Latest, page, FetchOptions::default())
            .await
    }

    /// Trending maps
    pub async fn hot(&self, page: u32) -> Result<Page> {
        self.listing_page(PageType::Hot, page, FetchOptions::default())
            .await
    }

    /// Highest rated maps
    pub async fn rating(&self, page: u32) -> Result<Page> {
        self.listing_page(PageType::Rating, page, FetchOptions::default())
            .await
    }

    /// Most downloaded maps
    pub async fn downloads(&self, page: u32) -> Result<Page> {
        self.listing_page(PageType::Downloads, page, FetchOptions::default())
            .await
    }

    /// Most played maps
    pub async fn plays(&self, page: u32) -> Result<Page> {
        self.listing_page(PageType::Plays, page, FetchOptions::default())
            .await
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Plain text search
    pub async fn search(&self, query: &str, page: u32) -> Result<Page> {
        self.search_with(query, false, page, FetchOptions::default())
            .await
    }

    /// Advanced (Lucene syntax) search
    pub async fn search_advanced(&self, query: &str, page: u32) -> Result<Page> {
        self.search_with(query, true, page, FetchOptions::default())
            .await
    }

    /// Search with explicit mode and options
    pub async fn search_with(
        &self,
        query: &str,
        advanced: bool,
        page: u32,
        options: FetchOptions,
    ) -> Result<Page> {
        let query = search_query(query);
        self.fetch_page(search_base(advanced), page, Some(&query), options)
            .await
    }

    /// Pager over search results
    pub fn search_pager(&self, query: &str, advanced: bool) -> Pager {
        Pager::new(
            self.clone(),
            search_base(advanced),
            Some(search_query(query)),
        )
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Look up a map by its short key
    pub async fn beatmap_by_key(&self, key: &str) -> Result<Option<Beatmap>> {
        self.beatmap_by_key_with(key, FetchOptions::default())
            .await
    }

    /// Look up a map by key with options
    pub async fn beatmap_by_key_with(
        &self,
        key: &str,
        options: FetchOptions,
    ) -> Result<Option<Beatmap>> {
        let map = self
            .fetch_optional::<Beatmap>(&format!("maps/detail/{key}"), options)
            .await?;
        Ok(map.map(|map| self.bind_beatmap(map)))
    }

    /// Look up a map by its content hash
    pub async fn beatmap_by_hash(&self, hash: &str) -> Result<Option<Beatmap>> {
        self.beatmap_by_hash_with(hash, FetchOptions::default())
            .await
    }

    /// Look up a map by hash with options
    pub async fn beatmap_by_hash_with(
        &self,
        hash: &str,
        options: FetchOptions,
    ) -> Result<Option<Beatmap>> {
        let map = self
            .fetch_optional::<Beatmap>(&format!("maps/by-hash/{hash}"), options)
            .await?;
        Ok(map.map(|map| self.bind_beatmap(map)))
    }

    /// Look up a user by id
    pub async fn user(&self, id: &str) -> Result<Option<User>> {
        self.user_with(id, FetchOptions::default()).await
    }

    /// Look up a user by id with options
    pub async fn user_with(&self, id: &str, options: FetchOptions) -> Result<Option<User>> {
        let user = self
            .fetch_optional::<User>(&format!("users/find/{id}"), options)
            .await?;
        Ok(user.map(|mut user| {
            user.attach(self);
            user
        }))
    }

    /// GET and decode, mapping 404 to `None`
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Result<Option<T>> {
        let response = self
            .http
            .execute(&Request::get(path).with_options(options))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{path} not found");
            return Ok(None);
        }

        Ok(Some(response.error_for_status()?.json()?))
    }

    fn bind_beatmap(&self, mut map: Beatmap) -> Beatmap {
        if let Some(uploader) = map.uploader.as_mut() {
            uploader.attach(self);
        }
        map
    }
}

impl std::fmt::Debug for BeatSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeatSaver")
            .field("user_agent", &self.http.user_agent())
            .field("api_root", &self.http.options().api_root())
            .finish()
    }
}

fn search_base(advanced: bool) -> &'static str {
    if advanced {
        "search/advanced"
    } else {
        "search/text"
    }
}

fn search_query(query: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_query_encoding() {
        assert_eq!(search_query("camellia"), "q=camellia");
        assert_eq!(search_query("rock & roll"), "q=rock+%26+roll");
    }

    #[test]
    fn test_search_base() {
        assert_eq!(search_base(false), "search/text");
        assert_eq!(search_base(true), "search/advanced");
    }

    #[test]
    fn test_debug_shows_agent() {
        let client = BeatSaver::new(ClientOptions::new("DebugApp", "3")).unwrap();
        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("DebugApp/3"));
        assert!(debug_str.contains("https://beatsaver.com/api"));
    }
}
