//! Media engine boundary
//!
//! The decoding/rendering engine is a black box. The session only creates
//! handles through [`MediaEngine`] and drives them through [`MediaHandle`];
//! everything it learns back arrives through the status and time callbacks.

pub mod simulated;

pub use simulated::{MediaCommand, SimulatedEngine};

use crate::error::Result;
use cytgm_common::VideoRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Status reported by a media handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// Waiting for enough data to start or continue (stall)
    WaitingToPlay,
    /// Loaded and able to play
    ReadyToPlay,
    Playing,
    Paused,
    /// Engine-level failure; surfaced only through the buffering flag
    Failed(String),
}

impl MediaStatus {
    /// Whether this status means the viewer is waiting on data
    pub fn is_buffering(&self) -> bool {
        matches!(self, MediaStatus::WaitingToPlay)
    }
}

/// Token identifying one subscription on one handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub Uuid);

impl SubscriptionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Status callback
pub type StatusCallback = Box<dyn Fn(MediaStatus) + Send + Sync + 'static>;

/// Periodic time callback: `(elapsed_seconds, total_duration_seconds)`
///
/// Duration is 0.0 while unknown.
pub type TimeCallback = Box<dyn Fn(f64, f64) + Send + Sync + 'static>;

/// One playable media item and its transport controls
///
/// Commands are fire-and-forget; engine failures surface as status updates.
pub trait MediaHandle: Send {
    /// Reference this handle was created for
    fn video(&self) -> &VideoRef;

    fn play(&mut self);

    fn pause(&mut self);

    /// Seek to an absolute position in seconds
    fn seek(&mut self, seconds: f64);

    /// Volume in `[0, 1]`
    fn set_volume(&mut self, volume: f32);

    /// Rate in `[0.5, 2.0]`
    fn set_rate(&mut self, rate: f32);

    fn subscribe_status(&mut self, callback: StatusCallback) -> SubscriptionToken;

    /// Register a periodic time callback firing every `interval`
    fn subscribe_time(&mut self, interval: Duration, callback: TimeCallback) -> SubscriptionToken;

    /// Cancel a status or time subscription; unknown tokens are ignored
    fn unsubscribe(&mut self, token: SubscriptionToken);
}

/// Factory for media handles
pub trait MediaEngine: Send + Sync {
    fn create(&self, video: &VideoRef) -> Result<Box<dyn MediaHandle>>;
}
