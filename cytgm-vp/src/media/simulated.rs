//! Simulated media engine
//!
//! Clock-driven stand-in for a real decoder: each handle keeps a playback
//! position advanced by tokio timers, reports status changes and periodic
//! time updates through the registered callbacks, and records every command
//! it receives. Drives the demo binary and the test suites.

use super::{MediaEngine, MediaHandle, MediaStatus, StatusCallback, SubscriptionToken, TimeCallback};
use crate::error::{Error, Result};
use cytgm_common::VideoRef;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Command observed by a simulated handle
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Created,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    SetRate(f32),
    SubscribeStatus,
    SubscribeTime,
    Unsubscribe,
    Dropped,
}

/// One entry of the engine-wide command log
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub handle_id: u64,
    pub video: VideoRef,
    pub command: MediaCommand,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct EngineShared {
    next_handle_id: AtomicU64,
    duration: f64,
    startup_latency: Duration,
    failing: Mutex<HashSet<VideoRef>>,
    log: Mutex<Vec<CommandRecord>>,
}

impl EngineShared {
    fn record(&self, handle_id: u64, video: &VideoRef, command: MediaCommand) {
        lock(&self.log).push(CommandRecord {
            handle_id,
            video: video.clone(),
            command,
        });
    }
}

/// Engine producing [`SimulatedHandle`]s
///
/// Cheap to clone; clones share the command log. Handles drive their clocks
/// with spawned tokio tasks, so `play` and `subscribe_time` must be called
/// from within a tokio runtime.
#[derive(Clone)]
pub struct SimulatedEngine {
    shared: Arc<EngineShared>,
}

impl SimulatedEngine {
    /// Every video created by this engine lasts `duration_secs`
    pub fn new(duration_secs: f64) -> Self {
        Self::build(duration_secs, Duration::ZERO)
    }

    /// Report `WaitingToPlay` for `latency` after the first play of each handle
    pub fn with_startup_latency(duration_secs: f64, latency: Duration) -> Self {
        Self::build(duration_secs, latency)
    }

    fn build(duration_secs: f64, startup_latency: Duration) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                next_handle_id: AtomicU64::new(1),
                duration: duration_secs.max(0.0),
                startup_latency,
                failing: Mutex::new(HashSet::new()),
                log: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Make `create` fail for this video
    pub fn fail_video(&self, video: impl Into<VideoRef>) {
        lock(&self.shared.failing).insert(video.into());
    }

    /// Snapshot of every command received so far
    pub fn commands(&self) -> Vec<CommandRecord> {
        lock(&self.shared.log).clone()
    }

    /// Commands received by one handle, in order
    pub fn commands_for(&self, handle_id: u64) -> Vec<MediaCommand> {
        lock(&self.shared.log)
            .iter()
            .filter(|r| r.handle_id == handle_id)
            .map(|r| r.command.clone())
            .collect()
    }

    /// Ids of all handles created so far, in creation order
    pub fn created_handles(&self) -> Vec<u64> {
        lock(&self.shared.log)
            .iter()
            .filter(|r| r.command == MediaCommand::Created)
            .map(|r| r.handle_id)
            .collect()
    }

    /// Number of occurrences of `command` across all handles
    pub fn count(&self, command: &MediaCommand) -> usize {
        lock(&self.shared.log)
            .iter()
            .filter(|r| &r.command == command)
            .count()
    }
}

impl MediaEngine for SimulatedEngine {
    fn create(&self, video: &VideoRef) -> Result<Box<dyn MediaHandle>> {
        if lock(&self.shared.failing).contains(video) {
            return Err(Error::Media(format!("cannot open {}", video)));
        }

        let id = self.shared.next_handle_id.fetch_add(1, Ordering::Relaxed);
        self.shared.record(id, video, MediaCommand::Created);
        debug!("Simulated handle {} created for {}", id, video);

        Ok(Box::new(SimulatedHandle {
            id,
            video: video.clone(),
            duration: self.shared.duration,
            startup_latency: self.shared.startup_latency,
            engine: Arc::clone(&self.shared),
            state: Arc::new(Mutex::new(HandleState::default())),
            time_tasks: HashMap::new(),
            status_tokens: HashSet::new(),
            startup_task: None,
        }))
    }
}

type SharedStatusCallback = Arc<dyn Fn(MediaStatus) + Send + Sync>;

struct HandleState {
    position: f64,
    playing: bool,
    started: bool,
    buffering: bool,
    rate: f32,
    volume: f32,
    status_callbacks: HashMap<SubscriptionToken, SharedStatusCallback>,
}

impl Default for HandleState {
    fn default() -> Self {
        Self {
            position: 0.0,
            playing: false,
            started: false,
            buffering: false,
            rate: 1.0,
            volume: 1.0,
            status_callbacks: HashMap::new(),
        }
    }
}

fn notify(state: &Mutex<HandleState>, status: MediaStatus) {
    // Callbacks run outside the lock
    let callbacks: Vec<SharedStatusCallback> =
        lock(state).status_callbacks.values().cloned().collect();
    for callback in callbacks {
        callback(status.clone());
    }
}

/// Handle produced by [`SimulatedEngine`]
pub struct SimulatedHandle {
    id: u64,
    video: VideoRef,
    duration: f64,
    startup_latency: Duration,
    engine: Arc<EngineShared>,
    state: Arc<Mutex<HandleState>>,
    time_tasks: HashMap<SubscriptionToken, JoinHandle<()>>,
    status_tokens: HashSet<SubscriptionToken>,
    startup_task: Option<JoinHandle<()>>,
}

impl SimulatedHandle {
    fn record(&self, command: MediaCommand) {
        self.engine.record(self.id, &self.video, command);
    }
}

impl MediaHandle for SimulatedHandle {
    fn video(&self) -> &VideoRef {
        &self.video
    }

    fn play(&mut self) {
        self.record(MediaCommand::Play);

        let first_play = {
            let mut state = lock(&self.state);
            state.playing = true;
            let first = !state.started;
            state.started = true;
            first
        };

        if first_play && !self.startup_latency.is_zero() {
            lock(&self.state).buffering = true;
            notify(&self.state, MediaStatus::WaitingToPlay);

            let state = Arc::clone(&self.state);
            let latency = self.startup_latency;
            self.startup_task = Some(tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                let still_playing = {
                    let mut s = lock(&state);
                    s.buffering = false;
                    s.playing
                };
                notify(&state, MediaStatus::ReadyToPlay);
                if still_playing {
                    notify(&state, MediaStatus::Playing);
                }
            }));
        } else {
            if first_play {
                notify(&self.state, MediaStatus::ReadyToPlay);
            }
            notify(&self.state, MediaStatus::Playing);
        }
    }

    fn pause(&mut self) {
        self.record(MediaCommand::Pause);
        lock(&self.state).playing = false;
        notify(&self.state, MediaStatus::Paused);
    }

    fn seek(&mut self, seconds: f64) {
        self.record(MediaCommand::Seek(seconds));
        lock(&self.state).position = seconds.clamp(0.0, self.duration);
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(MediaCommand::SetVolume(volume));
        lock(&self.state).volume = volume;
    }

    fn set_rate(&mut self, rate: f32) {
        self.record(MediaCommand::SetRate(rate));
        lock(&self.state).rate = rate;
    }

    fn subscribe_status(&mut self, callback: StatusCallback) -> SubscriptionToken {
        self.record(MediaCommand::SubscribeStatus);
        let token = SubscriptionToken::new();
        lock(&self.state)
            .status_callbacks
            .insert(token, Arc::from(callback));
        self.status_tokens.insert(token);
        token
    }

    fn subscribe_time(&mut self, interval: Duration, callback: TimeCallback) -> SubscriptionToken {
        self.record(MediaCommand::SubscribeTime);
        let token = SubscriptionToken::new();
        let state = Arc::clone(&self.state);
        let duration = self.duration;
        let handle_id = self.id;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let (elapsed, volume) = {
                    let mut s = lock(&state);
                    if s.playing && !s.buffering {
                        let step = interval.as_secs_f64() * s.rate as f64;
                        s.position = (s.position + step).min(duration);
                        if s.position >= duration {
                            s.playing = false;
                        }
                    }
                    (s.position, s.volume)
                };
                trace!(
                    "Simulated handle {} tick: {:.2}/{:.2} (volume {:.2})",
                    handle_id, elapsed, duration, volume
                );
                callback(elapsed, duration);
            }
        });

        self.time_tasks.insert(token, task);
        token
    }

    fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.record(MediaCommand::Unsubscribe);
        if let Some(task) = self.time_tasks.remove(&token) {
            task.abort();
        } else if self.status_tokens.remove(&token) {
            lock(&self.state).status_callbacks.remove(&token);
        }
    }
}

impl Drop for SimulatedHandle {
    fn drop(&mut self) {
        for (_, task) in self.time_tasks.drain() {
            task.abort();
        }
        if let Some(task) = self.startup_task.take() {
            task.abort();
        }
        lock(&self.state).status_callbacks.clear();
        self.record(MediaCommand::Dropped);
    }
}
