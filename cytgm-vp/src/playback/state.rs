//! Session state record
//!
//! The one record the presentation layer reads. It is owned and mutated only
//! by the [`PlaybackSession`](super::PlaybackSession); observers get clones
//! through the controller's watch channel.

use crate::playback::transition::{NavigationRequest, TransitionCoordinator};
use cytgm_common::events::{Orientation, PlaybackState, TransitionDirection};
use cytgm_common::VideoRef;
use serde::Serialize;

/// Presentation view of the transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransitionSnapshot {
    pub direction: TransitionDirection,
    /// True between an accepted navigation and the media swap
    pub pending: bool,
}

impl TransitionSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn pending(direction: TransitionDirection) -> Self {
        Self {
            direction,
            pending: true,
        }
    }
}

/// Which navigation controls should be enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationAvailability {
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

/// Snapshot of a playback session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub current_index: usize,
    pub playlist_len: usize,
    /// Video loaded in the active handle (None once torn down)
    pub current_video: Option<VideoRef>,
    /// False once the session has been torn down
    pub is_active: bool,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub is_fullscreen: bool,
    pub orientation: Orientation,
    /// Seconds
    pub current_time: f64,
    /// Seconds; 0.0 while unknown
    pub duration: f64,
    pub volume: f32,
    pub rate: f32,
    pub transition: TransitionSnapshot,
}

impl SessionState {
    pub(crate) fn new(
        current_index: usize,
        playlist_len: usize,
        current_video: VideoRef,
        volume: f32,
        rate: f32,
    ) -> Self {
        Self {
            current_index,
            playlist_len,
            current_video: Some(current_video),
            is_active: true,
            is_playing: false,
            is_buffering: false,
            is_fullscreen: false,
            orientation: Orientation::Portrait,
            current_time: 0.0,
            duration: 0.0,
            volume,
            rate,
            transition: TransitionSnapshot::idle(),
        }
    }

    pub fn has_active_media(&self) -> bool {
        self.is_active && self.current_video.is_some()
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState::from_playing(self.is_playing)
    }

    /// Controls to enable; both disabled while a transition is in flight
    pub fn navigation(&self) -> NavigationAvailability {
        let idle = self.is_active && !self.transition.pending;
        NavigationAvailability {
            can_go_previous: idle
                && TransitionCoordinator::can_move(
                    self.current_index,
                    self.playlist_len,
                    NavigationRequest::Previous,
                ),
            can_go_next: idle
                && TransitionCoordinator::can_move(
                    self.current_index,
                    self.playlist_len,
                    NavigationRequest::Next,
                ),
        }
    }

    /// Playback progress in `[0, 1]`; 0.0 while duration is unknown
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(index: usize, len: usize) -> SessionState {
        SessionState::new(index, len, VideoRef::from("v"), 0.5, 1.0)
    }

    #[test]
    fn test_navigation_at_edges() {
        let first = state(0, 3).navigation();
        assert!(!first.can_go_previous);
        assert!(first.can_go_next);

        let last = state(2, 3).navigation();
        assert!(last.can_go_previous);
        assert!(!last.can_go_next);
    }

    #[test]
    fn test_navigation_disabled_while_pending_or_inactive() {
        let mut s = state(1, 3);
        s.transition = TransitionSnapshot::pending(TransitionDirection::Forward);
        assert_eq!(
            s.navigation(),
            NavigationAvailability {
                can_go_previous: false,
                can_go_next: false
            }
        );

        let mut s = state(1, 3);
        s.is_active = false;
        assert!(!s.navigation().can_go_next);
    }

    #[test]
    fn test_progress() {
        let mut s = state(0, 1);
        assert_eq!(s.progress(), 0.0);
        s.duration = 200.0;
        s.current_time = 50.0;
        assert_eq!(s.progress(), 0.25);
    }

    #[test]
    fn test_serializes_for_ui_bridge() {
        let json = serde_json::to_value(state(0, 2)).unwrap();
        assert_eq!(json["current_video"], "v");
        assert_eq!(json["transition"]["direction"], "none");
        assert_eq!(json["orientation"], "portrait");
    }
}
