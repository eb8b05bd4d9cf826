//! Internal session events (not exposed on the EventBus)
//!
//! Media callbacks and settle continuations never touch session state
//! directly. They post one of these onto the controller's channel, tagged with
//! the generation that was current when they were registered, and the session
//! discards any whose generation has since moved on.

use crate::media::MediaStatus;

/// Asynchronous input to a [`PlaybackSession`](super::PlaybackSession)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Periodic time update from the time observer
    ///
    /// # Fields
    /// * `generation` - observer generation the tick was registered under
    /// * `elapsed` - playback position in seconds
    /// * `duration` - total duration in seconds (0.0 while unknown)
    TimeTick {
        generation: u64,
        elapsed: f64,
        duration: f64,
    },

    /// Status change from a media handle
    StatusChanged {
        handle_generation: u64,
        status: MediaStatus,
    },

    /// Settle delay for a navigation elapsed
    SettleElapsed { epoch: u64 },
}
