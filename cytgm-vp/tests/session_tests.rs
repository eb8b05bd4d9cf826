//! Playback session behavior against the simulated engine
//!
//! Runs on a paused tokio clock so settle delays and observer ticks advance
//! deterministically.

mod helpers;

use cytgm_common::events::{CytgmEvent, TransitionDirection};
use cytgm_vp::media::{MediaCommand, MediaStatus};
use cytgm_vp::playback::{NavigationOutcome, SessionEvent, TransitionSnapshot};
use cytgm_vp::{Error, SessionConfig};
use helpers::{refs, SessionFixture, VIDEO_SECONDS};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_initialize_at_every_valid_start_index() {
    for len in 1..=4 {
        for start in 0..len {
            let f = SessionFixture::try_new(refs(len), SessionConfig::default().with_start_index(start))
                .unwrap();
            assert_eq!(f.session.state().current_index, start);
            assert!(f.session.state().has_active_media());
            assert_eq!(f.engine.created_handles().len(), 1);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_initialize_invalid_playlist_creates_nothing() {
    let empty = SessionFixture::try_new(Vec::new(), SessionConfig::default());
    assert!(matches!(empty, Err(Error::InvalidPlaylist(_))));

    let out_of_range = SessionFixture::try_new(refs(3), SessionConfig::default().with_start_index(3));
    assert!(matches!(out_of_range, Err(Error::InvalidPlaylist(_))));
}

#[tokio::test(start_paused = true)]
async fn test_boundary_navigation_leaves_state_unchanged() {
    let mut f = SessionFixture::new(2);
    let before = f.session.snapshot();
    assert_eq!(f.session.previous().unwrap(), NavigationOutcome::AtBoundary);
    assert_eq!(f.session.snapshot(), before);

    let mut f = SessionFixture::try_new(refs(2), SessionConfig::default().with_start_index(1)).unwrap();
    let before = f.session.snapshot();
    assert_eq!(f.session.next().unwrap(), NavigationOutcome::AtBoundary);
    assert_eq!(f.session.next().unwrap(), NavigationOutcome::AtBoundary);
    assert_eq!(f.session.snapshot(), before);
    assert_eq!(f.engine.created_handles().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_next_settles_onto_new_handle_only() {
    let mut f = SessionFixture::new(3);
    let old_generation = f.session.observer_generation().unwrap();
    let old_handle = f.engine.created_handles()[0];

    f.session.next().unwrap();
    f.settle().await;

    let state = f.session.state();
    assert_eq!(state.current_index, 1);
    assert!(state.is_playing);
    assert_eq!(state.transition, TransitionSnapshot::idle());

    let handles = f.engine.created_handles();
    assert_eq!(handles.len(), 2);
    let old_commands = f.engine.commands_for(old_handle);
    assert!(old_commands.contains(&MediaCommand::Unsubscribe));
    assert!(old_commands.contains(&MediaCommand::Dropped));
    let new_commands = f.engine.commands_for(handles[1]);
    assert!(new_commands.contains(&MediaCommand::SubscribeTime));
    assert!(new_commands.contains(&MediaCommand::Play));

    // A late tick from the old observer is ignored
    let before = f.session.snapshot();
    assert!(!f.session.handle_event(SessionEvent::TimeTick {
        generation: old_generation,
        elapsed: 42.0,
        duration: VIDEO_SECONDS,
    }));
    assert_eq!(f.session.snapshot(), before);

    // Ticks from the new observer move the clock
    tokio::time::sleep(Duration::from_millis(2500)).await;
    f.drain();
    assert!(f.session.state().current_time > 0.0);
    assert_eq!(f.session.state().duration, VIDEO_SECONDS);
}

#[tokio::test(start_paused = true)]
async fn test_double_next_advances_exactly_once() {
    let mut f = SessionFixture::new(3);

    assert!(matches!(f.session.next().unwrap(), NavigationOutcome::Scheduled(_)));
    assert_eq!(f.session.next().unwrap(), NavigationOutcome::Ignored);
    assert_eq!(f.session.previous().unwrap(), NavigationOutcome::Ignored);
    f.settle().await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    f.drain();

    assert_eq!(f.session.state().current_index, 1);
    assert_eq!(f.engine.created_handles().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transition_is_visible_before_swap() {
    let mut f = SessionFixture::try_new(refs(3), SessionConfig::default().with_start_index(2)).unwrap();

    f.session.previous().unwrap();
    assert_eq!(
        f.session.state().transition,
        TransitionSnapshot::pending(TransitionDirection::Backward)
    );
    assert_eq!(f.session.state().current_index, 2);
    assert!(!f.session.navigation_availability().can_go_previous);

    tokio::time::sleep(Duration::from_millis(499)).await;
    f.drain();
    assert_eq!(f.session.state().current_index, 2, "Swap must wait for the settle delay");

    f.settle().await;
    assert_eq!(f.session.state().current_index, 1);
    assert!(f.session.navigation_availability().can_go_previous);
}

#[tokio::test(start_paused = true)]
async fn test_volume_and_rate_clamped() {
    let mut f = SessionFixture::new(1);

    f.session.set_volume(-0.3).unwrap();
    assert_eq!(f.session.state().volume, 0.0);
    f.session.set_volume(1.7).unwrap();
    assert_eq!(f.session.state().volume, 1.0);

    f.session.set_rate(0.1).unwrap();
    assert_eq!(f.session.state().rate, 0.5);
    f.session.set_rate(9.0).unwrap();
    assert_eq!(f.session.state().rate, 2.0);

    let id = f.engine.created_handles()[0];
    let commands = f.engine.commands_for(id);
    assert!(commands.contains(&MediaCommand::SetVolume(0.0)));
    assert!(commands.contains(&MediaCommand::SetRate(2.0)));
}

#[tokio::test(start_paused = true)]
async fn test_volume_and_rate_carry_over_to_next_video() {
    let mut f = SessionFixture::new(2);
    f.session.set_volume(0.2).unwrap();
    f.session.set_rate(1.5).unwrap();

    f.session.next().unwrap();
    f.settle().await;

    let id = f.engine.created_handles()[1];
    let commands = f.engine.commands_for(id);
    assert!(commands.contains(&MediaCommand::SetVolume(0.2)));
    assert!(commands.contains(&MediaCommand::SetRate(1.5)));
}

#[tokio::test(start_paused = true)]
async fn test_seek_clamps_to_known_duration() {
    let mut f = SessionFixture::new(1);
    f.session.play_pause().unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    f.drain();
    assert_eq!(f.session.state().duration, VIDEO_SECONDS);

    f.session.seek(VIDEO_SECONDS + 30.0).unwrap();
    assert_eq!(f.session.state().current_time, VIDEO_SECONDS);

    f.session.seek(-5.0).unwrap();
    assert_eq!(f.session.state().current_time, 0.0);

    let id = f.engine.created_handles()[0];
    assert!(f.engine.commands_for(id).contains(&MediaCommand::Seek(VIDEO_SECONDS)));
}

#[tokio::test(start_paused = true)]
async fn test_buffering_follows_status() {
    let mut f = SessionFixture::new(1);
    let generation = f.session.handle_generation();

    f.session.on_status_update(generation, MediaStatus::WaitingToPlay);
    assert!(f.session.state().is_buffering);
    f.session.on_status_update(generation, MediaStatus::ReadyToPlay);
    assert!(!f.session.state().is_buffering);
    f.session.on_status_update(generation, MediaStatus::Failed("stall".into()));
    assert!(!f.session.state().is_buffering);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_twice_detaches_once() {
    let mut f = SessionFixture::new(2);
    f.session.play_pause().unwrap();

    f.session.teardown();
    f.session.teardown();

    assert!(!f.session.is_active());
    assert_eq!(f.engine.count(&MediaCommand::SubscribeTime), 1);
    // One unsubscribe for the time observer, one for the status callback
    assert_eq!(f.engine.count(&MediaCommand::Unsubscribe), 2);
    assert_eq!(f.engine.count(&MediaCommand::Pause), 1);
}

#[tokio::test(start_paused = true)]
async fn test_operations_after_teardown_fail() {
    let mut f = SessionFixture::new(2);
    f.session.teardown();

    assert!(matches!(f.session.play_pause(), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.next(), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.previous(), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.seek(1.0), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.set_volume(0.3), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.set_rate(1.0), Err(Error::NoActiveMedia)));
    assert!(matches!(f.session.toggle_fullscreen(), Err(Error::NoActiveMedia)));
}

#[tokio::test(start_paused = true)]
async fn test_teardown_during_transition_suppresses_swap() {
    let mut f = SessionFixture::new(3);
    f.session.next().unwrap();
    f.session.teardown();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(f.drain(), 0);
    assert_eq!(f.engine.created_handles().len(), 1);
    assert_eq!(f.session.state().transition, TransitionSnapshot::idle());
}

#[tokio::test(start_paused = true)]
async fn test_fullscreen_toggles_orientation() {
    let mut f = SessionFixture::new(1);
    f.session.toggle_fullscreen().unwrap();
    assert!(f.session.state().is_fullscreen);
    assert_eq!(f.session.state().orientation, cytgm_common::events::Orientation::Landscape);
    f.session.toggle_fullscreen().unwrap();
    assert!(!f.session.state().is_fullscreen);
    assert_eq!(f.session.state().orientation, cytgm_common::events::Orientation::Portrait);
}

#[tokio::test(start_paused = true)]
async fn test_three_video_walkthrough() {
    let mut f = SessionFixture::new(3);
    let mut bus = f.events.subscribe();

    f.session.play_pause().unwrap();
    assert!(f.session.state().is_playing);

    f.session.next().unwrap();
    f.settle().await;
    assert_eq!(f.session.state().current_index, 1);
    assert!(f.session.state().is_playing);
    assert_eq!(f.session.state().transition.direction, TransitionDirection::None);

    f.session.next().unwrap();
    f.settle().await;
    assert_eq!(f.session.state().current_index, 2);

    assert_eq!(f.session.next().unwrap(), NavigationOutcome::AtBoundary);
    assert_eq!(f.session.state().current_index, 2);

    let mut transitions = 0;
    let mut video_changes = Vec::new();
    while let Ok(event) = bus.try_recv() {
        match event {
            CytgmEvent::TransitionStarted { .. } => transitions += 1,
            CytgmEvent::VideoChanged { index, .. } => video_changes.push(index),
            _ => {}
        }
    }
    assert_eq!(transitions, 2);
    assert_eq!(video_changes, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_paused_session_starts_playing_after_navigation() {
    let mut f = SessionFixture::new(2);
    assert!(!f.session.state().is_playing);

    f.session.next().unwrap();
    f.settle().await;
    assert!(f.session.state().is_playing);
}
