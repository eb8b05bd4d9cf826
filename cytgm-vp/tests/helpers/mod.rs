//! Shared fixtures for cytgm-vp integration tests
//!
//! - `SessionFixture`: a session on a simulated engine plus its event channel
//! - `refs`: synthetic playlists

#![allow(dead_code)]

use cytgm_common::events::EventBus;
use cytgm_common::VideoRef;
use cytgm_vp::media::SimulatedEngine;
use cytgm_vp::playback::SessionEvent;
use cytgm_vp::{PlaybackSession, Result, SessionConfig};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const VIDEO_SECONDS: f64 = 60.0;

pub fn refs(n: usize) -> Vec<VideoRef> {
    (0..n).map(|i| VideoRef::new(format!("video-{}", i))).collect()
}

pub struct SessionFixture {
    pub engine: SimulatedEngine,
    pub events: Arc<EventBus>,
    pub session: PlaybackSession,
    pub rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionFixture {
    pub fn try_new(videos: Vec<VideoRef>, config: SessionConfig) -> Result<Self> {
        let engine = SimulatedEngine::new(VIDEO_SECONDS);
        let events = Arc::new(EventBus::new(256));
        let (tx, rx) = mpsc::unbounded_channel();
        let session = PlaybackSession::initialize(
            Arc::new(engine.clone()),
            videos,
            config,
            tx,
            Arc::clone(&events),
        )?;
        Ok(Self {
            engine,
            events,
            session,
            rx,
        })
    }

    pub fn new(n: usize) -> Self {
        Self::try_new(refs(n), SessionConfig::default()).unwrap()
    }

    /// Deliver session events until the pending transition resolves
    pub async fn settle(&mut self) {
        while self.session.state().transition.pending {
            let event = self.rx.recv().await.expect("session event channel closed");
            self.session.handle_event(event);
        }
    }

    /// Deliver whatever events are queued right now
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.session.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }
}
