//! Session control task
//!
//! A [`PlaybackSession`] lives on exactly one tokio task. Callers talk to it
//! through a cloneable [`SessionHandle`]: commands go in over an mpsc channel
//! with a oneshot reply, state comes out over a `watch` channel, and discrete
//! events go out on the shared [`EventBus`].
//!
//! The task ends on `teardown` or when every handle has been dropped; either
//! way the session is torn down first. Commands sent after that fail with
//! `NoActiveMedia`.

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::media::MediaEngine;
use crate::playback::events::SessionEvent;
use crate::playback::session::{NavigationOutcome, PlaybackSession};
use crate::playback::state::{NavigationAvailability, SessionState};
use crate::playback::transition::NavigationRequest;
use cytgm_common::events::{CytgmEvent, EventBus};
use cytgm_common::VideoRef;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    PlayPause(Reply<()>),
    Navigate(NavigationRequest, Reply<NavigationOutcome>),
    Seek(f64, Reply<()>),
    SetVolume(f32, Reply<()>),
    SetRate(f32, Reply<()>),
    ToggleFullscreen(Reply<()>),
    Teardown(oneshot::Sender<()>),
}

/// Task owning one playback session
pub struct SessionController {
    session: PlaybackSession,
    commands: mpsc::Receiver<Command>,
    session_events: mpsc::UnboundedReceiver<SessionEvent>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionController {
    /// Initialize a session and start its control task
    ///
    /// Must be called from within a tokio runtime. Initialization errors are
    /// returned directly and no task is started.
    pub fn spawn(
        engine: Arc<dyn MediaEngine>,
        videos: Vec<VideoRef>,
        config: SessionConfig,
        events: Arc<EventBus>,
    ) -> Result<SessionHandle> {
        let (event_tx, session_events) = mpsc::unbounded_channel();
        let session =
            PlaybackSession::initialize(engine, videos, config, event_tx, Arc::clone(&events))?;

        let (state_tx, state_rx) = watch::channel(session.snapshot());
        let (command_tx, commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let controller = Self {
            session,
            commands,
            session_events,
            state_tx,
        };
        tokio::spawn(controller.run());

        Ok(SessionHandle {
            commands: command_tx,
            state_rx,
            events,
        })
    }

    async fn run(mut self) {
        debug!("Session control task started");

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let flow = match command {
                        Some(command) => self.apply(command),
                        None => {
                            info!("All session handles dropped, tearing down");
                            self.session.teardown();
                            ControlFlow::Break(())
                        }
                    };
                    self.publish();
                    if flow.is_break() {
                        break;
                    }
                }
                Some(event) = self.session_events.recv() => {
                    if self.session.handle_event(event) {
                        self.publish();
                    }
                }
            }
        }

        debug!("Session control task stopped");
    }

    /// Run one command; `Break` once the session has been torn down
    fn apply(&mut self, command: Command) -> ControlFlow<()> {
        let session = &mut self.session;
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::PlayPause(reply) => {
                let _ = reply.send(session.play_pause());
            }
            Command::Navigate(NavigationRequest::Next, reply) => {
                let _ = reply.send(session.next());
            }
            Command::Navigate(NavigationRequest::Previous, reply) => {
                let _ = reply.send(session.previous());
            }
            Command::Seek(to, reply) => {
                let _ = reply.send(session.seek(to));
            }
            Command::SetVolume(volume, reply) => {
                let _ = reply.send(session.set_volume(volume));
            }
            Command::SetRate(rate, reply) => {
                let _ = reply.send(session.set_rate(rate));
            }
            Command::ToggleFullscreen(reply) => {
                let _ = reply.send(session.toggle_fullscreen());
            }
            Command::Teardown(reply) => {
                // Watchers see the final state before the caller resumes
                self.session.teardown();
                self.publish();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Push the current state to watchers if it changed
    fn publish(&self) {
        let snapshot = self.session.state();
        self.state_tx.send_if_modified(|current| {
            if *current == *snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
    }
}

/// Cloneable client for a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<SessionState>,
    events: Arc<EventBus>,
}

impl SessionHandle {
    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| Error::NoActiveMedia)?;
        reply_rx.await.map_err(|_| Error::NoActiveMedia)?
    }

    pub async fn play_pause(&self) -> Result<()> {
        self.request(Command::PlayPause).await
    }

    pub async fn next(&self) -> Result<NavigationOutcome> {
        self.request(|reply| Command::Navigate(NavigationRequest::Next, reply))
            .await
    }

    pub async fn previous(&self) -> Result<NavigationOutcome> {
        self.request(|reply| Command::Navigate(NavigationRequest::Previous, reply))
            .await
    }

    pub async fn seek(&self, to: f64) -> Result<()> {
        self.request(|reply| Command::Seek(to, reply)).await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.request(|reply| Command::SetVolume(volume, reply)).await
    }

    pub async fn set_rate(&self, rate: f32) -> Result<()> {
        self.request(|reply| Command::SetRate(rate, reply)).await
    }

    pub async fn toggle_fullscreen(&self) -> Result<()> {
        self.request(Command::ToggleFullscreen).await
    }

    /// Tear the session down and stop its task
    ///
    /// Succeeds if the session is already gone.
    pub async fn teardown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(Command::Teardown(reply_tx)).await.is_err() {
            return Ok(());
        }
        let _ = reply_rx.await;
        Ok(())
    }

    /// Latest published state
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn navigation_availability(&self) -> NavigationAvailability {
        self.state_rx.borrow().navigation()
    }

    /// Receiver notified on every state change
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// State changes as a stream, starting with the current state
    pub fn state_stream(&self) -> WatchStream<SessionState> {
        WatchStream::new(self.state_rx.clone())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CytgmEvent> {
        self.events.subscribe()
    }

    /// Whether the control task is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}
