//! Playback-related type definitions
//!
//! Supporting types shared between the session controller and anything that
//! renders or reacts to its state.

use serde::{Deserialize, Serialize};

/// Playback state enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn from_playing(is_playing: bool) -> Self {
        if is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Direction of a playlist transition
///
/// `None` is the steady state. The presentation layer keys its exit/entry
/// animation off `Forward`/`Backward`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionDirection {
    #[default]
    None,
    Forward,
    Backward,
}

impl std::fmt::Display for TransitionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionDirection::None => write!(f, "none"),
            TransitionDirection::Forward => write!(f, "forward"),
            TransitionDirection::Backward => write!(f, "backward"),
        }
    }
}

/// Screen orientation hint that follows the fullscreen flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn for_fullscreen(is_fullscreen: bool) -> Self {
        if is_fullscreen {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}
