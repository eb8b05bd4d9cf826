//! Playback session controller
//!
//! - `session`: the PlaybackSession state machine
//! - `transition`: boundary checks and settle deadlines for navigation
//! - `time_observer`: single periodic time subscription per session
//! - `controller`: tokio task owning a session and serving commands

pub mod controller;
pub mod events;
pub mod playlist;
pub mod session;
pub mod state;
pub mod time_observer;
pub mod transition;

pub use controller::{SessionController, SessionHandle};
pub use events::SessionEvent;
pub use playlist::{load_catalog_refs, Playlist};
pub use session::{NavigationOutcome, PlaybackSession};
pub use state::{NavigationAvailability, SessionState, TransitionSnapshot};
pub use time_observer::TimeObserverRegistry;
pub use transition::{NavigationRequest, TransitionCoordinator, TransitionDecision, TransitionPlan};
