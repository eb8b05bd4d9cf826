//! Catalog video model
//!
//! The catalog is a JSON array of videos. Loading it is the caller's concern;
//! the playback session only ever sees the ordered list of [`VideoRef`]s
//! derived from it.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque reference to one playable video (identifier or URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoRef(String);

impl VideoRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VideoRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Free-form catalog tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub String);

/// One catalog entry
///
/// `date_added` is a plain calendar date in `yyyy-MM-dd` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub date_added: NaiveDate,
    pub link: String,
}

impl Video {
    /// Playlist reference for this video
    pub fn video_ref(&self) -> VideoRef {
        VideoRef::new(self.link.clone())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.0.eq_ignore_ascii_case(tag))
    }
}

/// Parse a catalog document (JSON array of videos)
pub fn parse_catalog(json: &str) -> Result<Vec<Video>> {
    let videos: Vec<Video> = serde_json::from_str(json)?;
    Ok(videos)
}

/// Read and parse a catalog file
pub fn load_catalog(path: &Path) -> Result<Vec<Video>> {
    let contents = std::fs::read_to_string(path)?;
    parse_catalog(&contents).map_err(|e| match e {
        Error::Parse(msg) => Error::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}
