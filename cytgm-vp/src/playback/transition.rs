//! Transition coordinator
//!
//! Pure decision logic for playlist navigation: boundary checks and the
//! descriptor of the transition to enter. Holds no mutable state; the session
//! stores whatever plan is in flight.
//!
//! Navigation is two-phase. Accepting a request only starts the visual
//! transition; the media swap happens at `deadline`, once the settle delay
//! has elapsed.

use cytgm_common::events::TransitionDirection;
use std::time::Duration;
use tokio::time::Instant;

/// Requested navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    Next,
    Previous,
}

impl NavigationRequest {
    pub fn direction(self) -> TransitionDirection {
        match self {
            NavigationRequest::Next => TransitionDirection::Forward,
            NavigationRequest::Previous => TransitionDirection::Backward,
        }
    }
}

/// Transition to apply for an accepted navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub direction: TransitionDirection,
    pub from_index: usize,
    pub to_index: usize,
    /// When the new media handle becomes the active one
    pub deadline: Instant,
}

/// Outcome of planning a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Already at the first/last index; nothing to do
    AtBoundary,
    Planned(TransitionPlan),
}

/// Computes transition plans for a fixed settle delay
#[derive(Debug, Clone, Copy)]
pub struct TransitionCoordinator {
    settle_delay: Duration,
}

impl TransitionCoordinator {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Decide whether `request` is legal from `current_index` and, if so,
    /// which transition to enter
    ///
    /// An out-of-range `current_index` is treated as being at the boundary
    /// in the requested direction.
    pub fn plan(
        &self,
        current_index: usize,
        playlist_len: usize,
        request: NavigationRequest,
        now: Instant,
    ) -> TransitionDecision {
        let target = match request {
            NavigationRequest::Next => current_index
                .checked_add(1)
                .filter(|&next| next < playlist_len),
            NavigationRequest::Previous => current_index
                .checked_sub(1)
                .filter(|&prev| prev < playlist_len),
        };

        match target {
            Some(to_index) => TransitionDecision::Planned(TransitionPlan {
                direction: request.direction(),
                from_index: current_index,
                to_index,
                deadline: now + self.settle_delay,
            }),
            None => TransitionDecision::AtBoundary,
        }
    }

    /// Whether `request` would be accepted, without building a plan
    pub fn can_move(current_index: usize, playlist_len: usize, request: NavigationRequest) -> bool {
        match request {
            NavigationRequest::Next => current_index + 1 < playlist_len,
            NavigationRequest::Previous => current_index > 0 && current_index < playlist_len,
        }
    }
}
