//! CYTGM Video Player demo
//!
//! Drives a playback session against the simulated media engine: loads a
//! catalog (or a built-in playlist), runs a short scripted walk through the
//! playlist, and logs every state change.

use anyhow::{Context, Result};
use clap::Parser;
use cytgm_common::config::TomlConfig;
use cytgm_common::events::EventBus;
use cytgm_common::time::format_clock;
use cytgm_common::VideoRef;
use cytgm_vp::media::SimulatedEngine;
use cytgm_vp::playback::load_catalog_refs;
use cytgm_vp::{SessionConfig, SessionController, SessionHandle};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cytgm-vp
#[derive(Parser, Debug)]
#[command(name = "cytgm-vp")]
#[command(about = "Playback session demo for the CYTGM video player")]
#[command(version)]
struct Args {
    /// Catalog JSON file (array of videos); built-in playlist when omitted
    #[arg(short = 'l', long, env = "CYTGM_CATALOG")]
    catalog: Option<PathBuf>,

    /// Config file (overrides CYTGM_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playlist index to start at
    #[arg(short, long, default_value = "0")]
    start_index: usize,

    /// Length of every simulated video in seconds
    #[arg(long, default_value = "30")]
    video_duration: f64,

    /// Number of scripted steps to run (0 waits for Ctrl+C)
    #[arg(long, default_value = "6")]
    demo_steps: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::resolve_and_load(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cytgm_vp={0},cytgm_common={0}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let videos = load_playlist(args.catalog.as_deref())?;
    info!("Starting CYTGM video player demo with {} videos", videos.len());

    let session_config = SessionConfig::from_toml(&config).with_start_index(args.start_index);
    let engine = Arc::new(SimulatedEngine::new(args.video_duration));
    let events = Arc::new(EventBus::new(256));

    let session = SessionController::spawn(engine, videos, session_config, events)
        .context("Failed to start playback session")?;

    let logger = tokio::spawn(log_state_changes(session.clone()));

    tokio::select! {
        result = run_script(&session, args.demo_steps) => result?,
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    session.teardown().await?;
    // The state stream ends once the control task drops its sender
    let _ = logger.await;

    info!("Demo complete");
    Ok(())
}

fn load_playlist(catalog: Option<&std::path::Path>) -> Result<Vec<VideoRef>> {
    match catalog {
        Some(path) => load_catalog_refs(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(["sunrise.mp4", "harbor.mp4", "night-drive.mp4"]
            .into_iter()
            .map(VideoRef::from)
            .collect()),
    }
}

/// Scripted walk: play, skip forward, adjust, skip back
async fn run_script(session: &SessionHandle, steps: usize) -> Result<()> {
    if steps == 0 {
        std::future::pending::<()>().await;
    }

    let settle = Duration::from_millis(1200);
    for step in 0..steps {
        let result = match step % 6 {
            0 => session.play_pause().await,
            1 => session.next().await.map(|outcome| info!("next: {:?}", outcome)),
            2 => session.set_volume(0.8).await,
            3 => session.seek(10.0).await,
            4 => session.toggle_fullscreen().await,
            _ => session.previous().await.map(|outcome| info!("previous: {:?}", outcome)),
        };
        if let Err(e) = result {
            warn!("Step {} failed: {}", step, e);
        }
        tokio::time::sleep(settle).await;
    }
    Ok(())
}

async fn log_state_changes(session: SessionHandle) {
    let mut states = session.state_stream();
    while let Some(state) = states.next().await {
        let nav = state.navigation();
        info!(
            "[{}/{}] {} {} {}/{} vol={:.2} rate={:.2}{}{} prev={} next={}",
            state.current_index + 1,
            state.playlist_len,
            state
                .current_video
                .as_ref()
                .map(|v| v.as_str())
                .unwrap_or("-"),
            state.playback_state(),
            format_clock(state.current_time),
            format_clock(state.duration),
            state.volume,
            state.rate,
            if state.is_buffering { " buffering" } else { "" },
            if state.transition.pending {
                format!(" transition={}", state.transition.direction)
            } else {
                String::new()
            },
            nav.can_go_previous,
            nav.can_go_next,
        );
        if !state.is_active {
            break;
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
