//! Ordered, session-immutable list of videos

use crate::error::{Error, Result};
use cytgm_common::video::load_catalog;
use cytgm_common::VideoRef;
use std::path::Path;
use tracing::{debug, info};

/// Non-empty ordered sequence of video references
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    videos: Vec<VideoRef>,
}

impl Playlist {
    /// Build a playlist; fails with `InvalidPlaylist` when empty
    pub fn new(videos: Vec<VideoRef>) -> Result<Self> {
        if videos.is_empty() {
            return Err(Error::InvalidPlaylist("playlist is empty".to_string()));
        }
        Ok(Self { videos })
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VideoRef> {
        self.videos.get(index)
    }

    /// Validate a start index against this playlist
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.videos.len() {
            return Err(Error::InvalidPlaylist(format!(
                "start index {} out of range for {} videos",
                index,
                self.videos.len()
            )));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoRef> {
        self.videos.iter()
    }
}

/// Read a catalog file and return its video references in catalog order
///
/// An empty catalog is returned as-is; `Playlist::new` rejects it later.
pub fn load_catalog_refs(path: &Path) -> Result<Vec<VideoRef>> {
    let catalog = load_catalog(path)?;
    info!("Loaded {} videos from {}", catalog.len(), path.display());

    Ok(catalog
        .iter()
        .map(|video| {
            debug!("Catalog #{} {} (added {})", video.id, video.title, video.date_added);
            video.video_ref()
        })
        .collect())
}
