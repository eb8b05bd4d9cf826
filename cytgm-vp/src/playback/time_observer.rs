//! Time observer registry
//!
//! Keeps at most one periodic time subscription alive per session. Every
//! attach gets a fresh generation number; the wrapped callback forwards a tick
//! only while its generation is still the current one, so once `detach`
//! returns no tick from the old subscription takes effect, even one the
//! engine had already scheduled. Ticks that were already forwarded carry their
//! generation, letting the receiver apply the same check on arrival.

use crate::media::{MediaHandle, SubscriptionToken};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct ActiveObservation {
    token: SubscriptionToken,
    generation: u64,
}

/// Owner of the session's single time subscription
#[derive(Debug)]
pub struct TimeObserverRegistry {
    interval: Duration,
    generation: Arc<AtomicU64>,
    active: Option<ActiveObservation>,
}

impl TimeObserverRegistry {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: Arc::new(AtomicU64::new(0)),
            active: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Subscribe `on_tick` to `handle`'s periodic time updates
    ///
    /// `on_tick` receives `(generation, elapsed, total_duration)`. Returns the
    /// generation assigned to this subscription.
    ///
    /// The previous subscription must already be detached; if it is not, it
    /// is invalidated (its ticks stop taking effect) but its token is
    /// forgotten, since the handle it belongs to is no longer reachable here.
    pub fn attach<F>(&mut self, handle: &mut dyn MediaHandle, on_tick: F) -> u64
    where
        F: Fn(u64, f64, f64) + Send + Sync + 'static,
    {
        if let Some(stale) = self.active.take() {
            warn!(
                "Time observer generation {} still attached; invalidating without unsubscribe",
                stale.generation
            );
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let token = handle.subscribe_time(
            self.interval,
            Box::new(move |elapsed, duration| {
                if current.load(Ordering::SeqCst) == generation {
                    on_tick(generation, elapsed, duration);
                }
            }),
        );

        self.active = Some(ActiveObservation { token, generation });
        debug!(
            "Time observer attached to {} (generation {}, every {:?})",
            handle.video(),
            generation,
            self.interval
        );
        generation
    }

    /// Cancel the active subscription on `handle`
    ///
    /// Returns false when nothing was attached, so calling it twice is safe
    /// and never unsubscribes twice.
    pub fn detach(&mut self, handle: &mut dyn MediaHandle) -> bool {
        match self.active.take() {
            Some(observation) => {
                // Invalidate first so a tick racing the unsubscribe is dropped
                self.generation.fetch_add(1, Ordering::SeqCst);
                handle.unsubscribe(observation.token);
                debug!(
                    "Time observer detached from {} (generation {})",
                    handle.video(),
                    observation.generation
                );
                true
            }
            None => false,
        }
    }

    /// Whether ticks tagged with `generation` may still be applied
    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .map(|observation| observation.generation == generation)
            .unwrap_or(false)
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.map(|observation| observation.generation)
    }

    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }
}
