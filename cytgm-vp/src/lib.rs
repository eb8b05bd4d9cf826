//! # CYTGM Video Player Library (cytgm-vp)
//!
//! Playback session controller for the video-watching app.
//!
//! **Purpose:** Own a single active media handle, move through an ordered
//! playlist with a two-phase (transition, then swap) navigation model, and
//! keep time/volume/rate/buffering state synchronized with the media engine.
//!
//! **Architecture:** A [`playback::PlaybackSession`] state machine driven by a
//! tokio task ([`playback::SessionController`]). Media callbacks and deferred
//! settle continuations re-enter the session as generation-tagged events.

pub mod config;
pub mod error;
pub mod media;
pub mod playback;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use playback::{PlaybackSession, SessionController, SessionHandle, SessionState};
