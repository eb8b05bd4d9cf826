//! Playback session
//!
//! **Responsibilities:**
//! - Own the single active media handle and the session state record
//! - Two-phase navigation: enter a transition now, swap media once the settle
//!   delay elapses
//! - Apply media callbacks (time, status) that are still current
//! - Scoped teardown: pause, detach, cancel the pending settle
//!
//! All methods run on one control task. Anything asynchronous (ticks, status
//! changes, settle continuations) comes back through [`SessionEvent`]s posted
//! on the channel handed to [`PlaybackSession::initialize`], each carrying the
//! generation it was registered under.

use crate::config::{clamp_rate, clamp_volume, SessionConfig};
use crate::error::{Error, Result};
use crate::media::{MediaEngine, MediaHandle, MediaStatus, SubscriptionToken};
use crate::playback::events::SessionEvent;
use crate::playback::playlist::Playlist;
use crate::playback::state::{NavigationAvailability, SessionState, TransitionSnapshot};
use crate::playback::time_observer::TimeObserverRegistry;
use crate::playback::transition::{
    NavigationRequest, TransitionCoordinator, TransitionDecision, TransitionPlan,
};
use cytgm_common::events::{CytgmEvent, EventBus, Orientation, PlaybackState};
use cytgm_common::VideoRef;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a `next`/`previous` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Transition entered; media swaps at `plan.deadline`
    Scheduled(TransitionPlan),
    /// Already at the first/last video; state unchanged
    AtBoundary,
    /// Another transition is still pending; state unchanged
    Ignored,
}

/// Transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionState {
    Idle,
    Pending { plan: TransitionPlan, epoch: u64 },
}

/// Playback session controller
pub struct PlaybackSession {
    engine: Arc<dyn MediaEngine>,
    playlist: Playlist,
    coordinator: TransitionCoordinator,
    observers: TimeObserverRegistry,

    /// Handle receiving transport commands; None once torn down
    active_handle: Option<Box<dyn MediaHandle>>,
    status_token: Option<SubscriptionToken>,
    /// Bumped on every handle install; tags status callbacks
    handle_generation: u64,

    /// Bumped on every accepted navigation and on teardown; tags settles
    epoch: u64,
    transition: TransitionState,
    settle_task: Option<JoinHandle<()>>,

    state: SessionState,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    events: Arc<EventBus>,
}

impl PlaybackSession {
    /// Create a session positioned at `config.start_index`
    ///
    /// Creates the first handle, applies the (clamped) initial volume and
    /// rate, and starts its time observer. Playback does not start until
    /// `play_pause`.
    ///
    /// Must be called from within a tokio runtime, as must `next` and
    /// `previous`: the settle continuation and the engine's observers are
    /// spawned tasks.
    ///
    /// # Errors
    /// `InvalidPlaylist` for an empty playlist or out-of-range start index;
    /// `Media` if the engine cannot open the first video. No session exists
    /// in either case.
    pub fn initialize(
        engine: Arc<dyn MediaEngine>,
        videos: Vec<VideoRef>,
        config: SessionConfig,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
        events: Arc<EventBus>,
    ) -> Result<Self> {
        let playlist = Playlist::new(videos)?;
        playlist.check_index(config.start_index)?;

        let start_index = config.start_index;
        let video = playlist
            .get(start_index)
            .cloned()
            .ok_or_else(|| Error::InvalidPlaylist(format!("no video at {}", start_index)))?;
        let handle = engine.create(&video)?;

        let state = SessionState::new(
            start_index,
            playlist.len(),
            video.clone(),
            clamp_volume(config.initial_volume),
            clamp_rate(config.initial_rate),
        );

        let mut session = Self {
            engine,
            coordinator: TransitionCoordinator::new(config.settle_delay),
            observers: TimeObserverRegistry::new(config.time_observer_interval),
            playlist,
            active_handle: None,
            status_token: None,
            handle_generation: 0,
            epoch: 0,
            transition: TransitionState::Idle,
            settle_task: None,
            state,
            event_tx,
            events,
        };
        session.install_handle(handle);

        info!(
            "Playback session initialized: {} videos, starting at {} ({})",
            session.playlist.len(),
            start_index,
            video
        );
        session.events.emit_lossy(CytgmEvent::VideoChanged {
            index: start_index,
            video: video.to_string(),
            timestamp: cytgm_common::time::now(),
        });

        Ok(session)
    }

    /// Current state record
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the state record for observers
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Which navigation controls the presentation layer should enable
    pub fn navigation_availability(&self) -> NavigationAvailability {
        self.state.navigation()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    /// Generation of the active time observer, if any
    pub fn observer_generation(&self) -> Option<u64> {
        self.observers.active_generation()
    }

    pub fn handle_generation(&self) -> u64 {
        self.handle_generation
    }

    /// Deadline of the pending transition, if one is in flight
    pub fn pending_deadline(&self) -> Option<Instant> {
        match self.transition {
            TransitionState::Pending { plan, .. } => Some(plan.deadline),
            TransitionState::Idle => None,
        }
    }

    /// Toggle between playing and paused
    pub fn play_pause(&mut self) -> Result<()> {
        let handle = self.active_handle.as_mut().ok_or(Error::NoActiveMedia)?;

        let old_state = self.state.playback_state();
        if self.state.is_playing {
            handle.pause();
            self.state.is_playing = false;
        } else {
            handle.play();
            self.state.is_playing = true;
        }
        let new_state = self.state.playback_state();

        info!("Playback state changed: {} -> {}", old_state, new_state);
        self.emit_state_change(old_state, new_state);
        Ok(())
    }

    /// Move to the next video after the settle delay
    ///
    /// Must be called from within a tokio runtime.
    pub fn next(&mut self) -> Result<NavigationOutcome> {
        self.navigate(NavigationRequest::Next)
    }

    /// Move to the previous video after the settle delay
    ///
    /// Must be called from within a tokio runtime.
    pub fn previous(&mut self) -> Result<NavigationOutcome> {
        self.navigate(NavigationRequest::Previous)
    }

    fn navigate(&mut self, request: NavigationRequest) -> Result<NavigationOutcome> {
        if !self.state.is_active {
            return Err(Error::NoActiveMedia);
        }

        if let TransitionState::Pending { plan, .. } = self.transition {
            debug!(
                "Navigation {:?} ignored: transition to {} still pending",
                request, plan.to_index
            );
            return Ok(NavigationOutcome::Ignored);
        }

        let decision = self.coordinator.plan(
            self.state.current_index,
            self.playlist.len(),
            request,
            Instant::now(),
        );

        let plan = match decision {
            TransitionDecision::AtBoundary => {
                debug!(
                    "Navigation {:?} at boundary (index {}), ignoring",
                    request, self.state.current_index
                );
                return Ok(NavigationOutcome::AtBoundary);
            }
            TransitionDecision::Planned(plan) => plan,
        };

        self.epoch += 1;
        let epoch = self.epoch;
        self.transition = TransitionState::Pending { plan, epoch };
        self.state.transition = TransitionSnapshot::pending(plan.direction);

        let tx = self.event_tx.clone();
        self.settle_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(plan.deadline).await;
            // Receiver gone means the session is gone too
            let _ = tx.send(SessionEvent::SettleElapsed { epoch });
        }));

        info!(
            "Transition {} started: {} -> {} (epoch {}, settles in {:?})",
            plan.direction,
            plan.from_index,
            plan.to_index,
            epoch,
            self.coordinator.settle_delay()
        );
        self.events.emit_lossy(CytgmEvent::TransitionStarted {
            direction: plan.direction,
            from_index: plan.from_index,
            to_index: plan.to_index,
            timestamp: cytgm_common::time::now(),
        });

        Ok(NavigationOutcome::Scheduled(plan))
    }

    /// Seek within the current video
    ///
    /// The target is clamped into `[0, duration]` (only the lower bound while
    /// duration is unknown). `current_time` is updated optimistically; the
    /// next tick corrects it.
    pub fn seek(&mut self, to: f64) -> Result<()> {
        let handle = self.active_handle.as_mut().ok_or(Error::NoActiveMedia)?;

        let lower_clamped = if to.is_nan() { 0.0 } else { to.max(0.0) };
        let target = if self.state.duration > 0.0 {
            lower_clamped.min(self.state.duration)
        } else {
            lower_clamped
        };

        handle.seek(target);
        self.state.current_time = target;
        debug!("Seek to {:.3}s (requested {:.3}s)", target, to);
        Ok(())
    }

    /// Set volume; out-of-range values are clamped into `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let handle = self.active_handle.as_mut().ok_or(Error::NoActiveMedia)?;

        let volume = clamp_volume(volume);
        handle.set_volume(volume);
        self.state.volume = volume;

        debug!("Volume set to {:.2}", volume);
        self.events.emit_lossy(CytgmEvent::VolumeChanged {
            volume,
            timestamp: cytgm_common::time::now(),
        });
        Ok(())
    }

    /// Set playback rate; out-of-range values are clamped into `[0.5, 2.0]`
    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        let handle = self.active_handle.as_mut().ok_or(Error::NoActiveMedia)?;

        let rate = clamp_rate(rate);
        handle.set_rate(rate);
        self.state.rate = rate;

        debug!("Rate set to {:.2}", rate);
        self.events.emit_lossy(CytgmEvent::RateChanged {
            rate,
            timestamp: cytgm_common::time::now(),
        });
        Ok(())
    }

    /// Flip the fullscreen hint (no media interaction)
    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        if !self.state.is_active {
            return Err(Error::NoActiveMedia);
        }

        self.state.is_fullscreen = !self.state.is_fullscreen;
        self.state.orientation = Orientation::for_fullscreen(self.state.is_fullscreen);

        debug!(
            "Fullscreen {} ({:?})",
            if self.state.is_fullscreen { "on" } else { "off" },
            self.state.orientation
        );
        self.events.emit_lossy(CytgmEvent::FullscreenChanged {
            is_fullscreen: self.state.is_fullscreen,
            orientation: self.state.orientation,
            timestamp: cytgm_common::time::now(),
        });
        Ok(())
    }

    /// Apply one asynchronous event; returns whether it changed state
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::TimeTick {
                generation,
                elapsed,
                duration,
            } => self.on_time_update(generation, elapsed, duration),
            SessionEvent::StatusChanged {
                handle_generation,
                status,
            } => self.on_status_update(handle_generation, status),
            SessionEvent::SettleElapsed { epoch } => self.complete_transition(epoch),
        }
    }

    /// Time callback from the observer registered under `generation`
    ///
    /// Stale generations are dropped silently.
    pub fn on_time_update(&mut self, generation: u64, elapsed: f64, duration: f64) -> bool {
        if !self.state.is_active || !self.observers.is_current(generation) {
            debug!(
                "Dropping stale time tick (generation {}, current {:?})",
                generation,
                self.observers.active_generation()
            );
            return false;
        }

        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        let mut current_time = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        if duration > 0.0 {
            current_time = current_time.min(duration);
        }

        self.state.duration = duration;
        self.state.current_time = current_time;

        self.events.emit_lossy(CytgmEvent::PlaybackProgress {
            current_time,
            duration,
            timestamp: cytgm_common::time::now(),
        });
        true
    }

    /// Status callback from the handle installed under `handle_generation`
    ///
    /// Stale generations are dropped silently. Only the buffering flag is
    /// derived from status; `is_playing` stays the user's intent.
    pub fn on_status_update(&mut self, handle_generation: u64, status: MediaStatus) -> bool {
        if !self.state.is_active || handle_generation != self.handle_generation {
            debug!(
                "Dropping stale status {:?} (generation {}, current {})",
                status, handle_generation, self.handle_generation
            );
            return false;
        }

        if let MediaStatus::Failed(reason) = &status {
            warn!("Media reported failure: {}", reason);
        }

        let is_buffering = status.is_buffering();
        if is_buffering == self.state.is_buffering {
            return false;
        }

        self.state.is_buffering = is_buffering;
        debug!("Buffering {}", if is_buffering { "started" } else { "ended" });
        self.events.emit_lossy(CytgmEvent::BufferingChanged {
            is_buffering,
            timestamp: cytgm_common::time::now(),
        });
        true
    }

    /// Settle continuation: swap to the planned video if `epoch` still owns
    /// the pending transition
    fn complete_transition(&mut self, epoch: u64) -> bool {
        let plan = match self.transition {
            TransitionState::Pending { plan, epoch: pending } if pending == epoch => plan,
            _ => {
                debug!(
                    "Dropping stale settle (epoch {}, current {})",
                    epoch, self.epoch
                );
                return false;
            }
        };
        if !self.state.is_active {
            return false;
        }
        self.settle_task = None;

        let video = match self.playlist.get(plan.to_index) {
            Some(video) => video.clone(),
            None => {
                warn!("Transition target {} outside playlist", plan.to_index);
                self.reset_transition();
                return true;
            }
        };

        let new_handle = match self.engine.create(&video) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    "Failed to open {} for index {}: {}; staying on index {}",
                    video, plan.to_index, e, self.state.current_index
                );
                self.reset_transition();
                return true;
            }
        };

        self.release_handle();

        let old_state = self.state.playback_state();
        self.state.current_index = plan.to_index;
        self.state.current_video = Some(video.clone());
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.state.is_buffering = false;

        self.install_handle(new_handle);
        if let Some(handle) = self.active_handle.as_mut() {
            handle.play();
        }
        self.state.is_playing = true;
        self.reset_transition();

        info!(
            "Transition {} settled: now at {} ({})",
            plan.direction, plan.to_index, video
        );
        self.events.emit_lossy(CytgmEvent::VideoChanged {
            index: plan.to_index,
            video: video.to_string(),
            timestamp: cytgm_common::time::now(),
        });
        self.emit_state_change(old_state, self.state.playback_state());
        true
    }

    /// Release everything the session holds
    ///
    /// Cancels any pending settle, detaches the time observer, pauses the
    /// active handle and marks the session inactive. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.state.is_active {
            debug!("Teardown on inactive session ignored");
            return;
        }

        if let Some(task) = self.settle_task.take() {
            task.abort();
        }
        self.epoch += 1;
        self.reset_transition();

        self.release_handle();
        self.state.is_active = false;
        self.state.is_playing = false;
        self.state.is_buffering = false;
        self.state.current_video = None;

        info!("Playback session torn down");
        self.events.emit_lossy(CytgmEvent::SessionEnded {
            timestamp: cytgm_common::time::now(),
        });
    }

    fn reset_transition(&mut self) {
        self.transition = TransitionState::Idle;
        self.state.transition = TransitionSnapshot::idle();
    }

    /// Make `handle` the active one: apply volume/rate, subscribe status,
    /// attach the time observer
    fn install_handle(&mut self, mut handle: Box<dyn MediaHandle>) {
        self.handle_generation += 1;
        let handle_generation = self.handle_generation;

        handle.set_volume(self.state.volume);
        handle.set_rate(self.state.rate);

        let status_tx = self.event_tx.clone();
        self.status_token = Some(handle.subscribe_status(Box::new(move |status| {
            let _ = status_tx.send(SessionEvent::StatusChanged {
                handle_generation,
                status,
            });
        })));

        let tick_tx = self.event_tx.clone();
        self.observers
            .attach(handle.as_mut(), move |generation, elapsed, duration| {
                let _ = tick_tx.send(SessionEvent::TimeTick {
                    generation,
                    elapsed,
                    duration,
                });
            });

        self.active_handle = Some(handle);
    }

    /// Detach observers from the active handle, pause and drop it
    fn release_handle(&mut self) {
        if let Some(mut handle) = self.active_handle.take() {
            self.observers.detach(handle.as_mut());
            if let Some(token) = self.status_token.take() {
                handle.unsubscribe(token);
            }
            handle.pause();
            debug!("Released handle for {}", handle.video());
        }
    }

    fn emit_state_change(&self, old_state: PlaybackState, new_state: PlaybackState) {
        if old_state == new_state {
            return;
        }
        self.events.emit_lossy(CytgmEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: cytgm_common::time::now(),
        });
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
