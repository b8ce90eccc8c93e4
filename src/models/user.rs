//! BeatSaver user accounts

use crate::client::BeatSaver;
use crate::error::{Error, Result};
use crate::http::FetchOptions;
use crate::pagination::{Page, Pager};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A BeatSaver user
///
/// Two users are equal when their ids match; the username is ignored.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Unique id
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub username: String,

    #[serde(skip)]
    client: Option<BeatSaver>,
}

impl User {
    /// Create a detached user value
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            client: None,
        }
    }

    pub(crate) fn attach(&mut self, client: &BeatSaver) {
        self.client = Some(client.clone());
    }

    /// Base path of this user's upload listing
    pub fn uploads_path(&self) -> String {
        format!("maps/uploader/{}", self.id)
    }

    /// Fetch one page of maps uploaded by this user
    pub async fn beatmaps(&self, page: u32) -> Result<Page> {
        self.beatmaps_with(page, FetchOptions::default()).await
    }

    /// Fetch one page of uploads with cancellation and progress options
    pub async fn beatmaps_with(&self, page: u32, options: FetchOptions) -> Result<Page> {
        self.client()?
            .fetch_page(&self.uploads_path(), page, None, options)
            .await
    }

    /// Lazy pager over every map this user uploaded
    pub fn beatmaps_pager(&self) -> Result<Pager> {
        Ok(Pager::new(self.client()?.clone(), self.uploads_path(), None))
    }

    fn client(&self) -> Result<&BeatSaver> {
        self.client.as_ref().ok_or(Error::Detached { kind: "User" })
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("attached", &self.client.is_some())
            .finish()
    }
}
