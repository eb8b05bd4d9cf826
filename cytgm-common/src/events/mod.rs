//! Event types for the CYTGM event system
//!
//! Provides shared event definitions and the EventBus used to notify the
//! presentation layer of discrete session changes.

mod playback_types;

pub use playback_types::{Orientation, PlaybackState, TransitionDirection};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// CYTGM event types
///
/// Events are broadcast via EventBus and can be serialized for any UI bridge.
/// Continuous state (the full session snapshot) travels separately; these are
/// the discrete edges a UI may want to animate or log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CytgmEvent {
    /// Playback state changed (Playing ↔ Paused)
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Navigation accepted; the visual transition may start
    ///
    /// The media swap happens once the settle delay elapses and is announced
    /// by `VideoChanged`.
    TransitionStarted {
        direction: TransitionDirection,
        from_index: usize,
        to_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new video became the active one
    VideoChanged {
        index: usize,
        video: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Periodic time update from the active video (seconds)
    PlaybackProgress {
        current_time: f64,
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Buffering flag flipped
    BufferingChanged {
        is_buffering: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed (0.0-1.0)
    VolumeChanged {
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback rate changed (0.5-2.0)
    RateChanged {
        rate: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Fullscreen toggled
    FullscreenChanged {
        is_fullscreen: bool,
        orientation: Orientation,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session torn down; no further events follow
    SessionEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CytgmEvent {
    /// Event type name as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            CytgmEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            CytgmEvent::TransitionStarted { .. } => "TransitionStarted",
            CytgmEvent::VideoChanged { .. } => "VideoChanged",
            CytgmEvent::PlaybackProgress { .. } => "PlaybackProgress",
            CytgmEvent::BufferingChanged { .. } => "BufferingChanged",
            CytgmEvent::VolumeChanged { .. } => "VolumeChanged",
            CytgmEvent::RateChanged { .. } => "RateChanged",
            CytgmEvent::FullscreenChanged { .. } => "FullscreenChanged",
            CytgmEvent::SessionEnded { .. } => "SessionEnded",
        }
    }
}

/// Broadcast bus for CytgmEvents
///
/// Thin wrapper over a tokio broadcast channel. Slow subscribers lose the
/// oldest events once `capacity` is exceeded.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<CytgmEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use cytgm_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CytgmEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CytgmEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
