//! Beatmap documents returned by listing and lookup endpoints
//!
//! Decoding is lenient: every field has a default and unknown fields are kept
//! in `extra`, since the payload shape is owned by the service.

use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Song and level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    pub level_author_name: String,
    pub bpm: f64,
    /// Length in seconds
    pub duration: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Usage counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub downloads: u64,
    pub plays: u64,
    pub up_votes: u64,
    pub down_votes: u64,
    pub rating: f64,
    pub heat: f64,
}

/// A beatmap
///
/// Equality compares ids only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Beatmap {
    #[serde(rename = "_id")]
    pub id: String,
    /// Short hexadecimal key
    pub key: String,
    /// SHA-1 of the map contents
    pub hash: String,
    pub name: String,
    pub description: String,
    pub uploader: Option<User>,
    pub metadata: Metadata,
    pub stats: Stats,
    pub uploaded: Option<DateTime<Utc>>,
    pub direct_download: Option<String>,
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    #[serde(rename = "coverURL")]
    pub cover_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Beatmap {
    /// Total up and down votes
    pub fn votes(&self) -> u64 {
        self.stats.up_votes + self.stats.down_votes
    }
}

impl PartialEq for Beatmap {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Beatmap {}
