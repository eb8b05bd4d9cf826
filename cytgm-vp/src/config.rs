//! Session configuration
//!
//! Converts the bootstrap TOML values into the typed settings a
//! [`PlaybackSession`](crate::playback::PlaybackSession) is created with.

use cytgm_common::config::TomlConfig;
use std::time::Duration;
use tracing::warn;

/// Lowest accepted volume
pub const MIN_VOLUME: f32 = 0.0;
/// Highest accepted volume
pub const MAX_VOLUME: f32 = 1.0;
/// Slowest accepted playback rate
pub const MIN_RATE: f32 = 0.5;
/// Fastest accepted playback rate
pub const MAX_RATE: f32 = 2.0;

/// Default delay between a navigation request and the media swap
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Default time observer cadence
pub const DEFAULT_TIME_OBSERVER_INTERVAL: Duration = Duration::from_secs(1);

const MIN_OBSERVER_INTERVAL_MS: u64 = 100;
const MAX_OBSERVER_INTERVAL_MS: u64 = 5000;

/// Clamp a volume into `[0, 1]`; NaN maps to silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return MIN_VOLUME;
    }
    volume.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Clamp a playback rate into `[0.5, 2.0]`; NaN maps to normal speed
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(MIN_RATE, MAX_RATE)
}

/// Settings for one playback session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Index of the first video to load
    pub start_index: usize,
    pub initial_volume: f32,
    pub initial_rate: f32,
    pub settle_delay: Duration,
    pub time_observer_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            initial_volume: 0.5,
            initial_rate: 1.0,
            settle_delay: DEFAULT_SETTLE_DELAY,
            time_observer_interval: DEFAULT_TIME_OBSERVER_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Build session settings from the `[playback]` TOML table
    ///
    /// Out-of-range values are clamped with a warning rather than rejected.
    pub fn from_toml(config: &TomlConfig) -> Self {
        let playback = &config.playback;

        let interval_ms = playback
            .time_observer_interval_ms
            .clamp(MIN_OBSERVER_INTERVAL_MS, MAX_OBSERVER_INTERVAL_MS);
        if interval_ms != playback.time_observer_interval_ms {
            warn!(
                "time_observer_interval_ms={} out of range, using {}",
                playback.time_observer_interval_ms, interval_ms
            );
        }

        let initial_volume = clamp_volume(playback.initial_volume);
        if initial_volume != playback.initial_volume {
            warn!(
                "initial_volume={} out of range, using {}",
                playback.initial_volume, initial_volume
            );
        }

        let initial_rate = clamp_rate(playback.initial_rate);
        if initial_rate != playback.initial_rate {
            warn!(
                "initial_rate={} out of range, using {}",
                playback.initial_rate, initial_rate
            );
        }

        Self {
            start_index: 0,
            initial_volume,
            initial_rate,
            settle_delay: Duration::from_millis(playback.settle_delay_ms),
            time_observer_interval: Duration::from_millis(interval_ms),
        }
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(-0.3), 0.0);
        assert_eq!(clamp_volume(1.7), 1.0);
        assert_eq!(clamp_volume(0.42), 0.42);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
    }

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(0.1), 0.5);
        assert_eq!(clamp_rate(9.0), 2.0);
        assert_eq!(clamp_rate(1.25), 1.25);
        assert_eq!(clamp_rate(f32::NAN), 1.0);
    }

    #[test]
    fn test_defaults_match_toml_defaults() {
        let from_toml = SessionConfig::from_toml(&TomlConfig::default());
        assert_eq!(from_toml, SessionConfig::default());
    }

    #[test]
    fn test_from_toml_clamps_out_of_range_values() {
        let toml = TomlConfig::from_toml_str(
            r#"
            [playback]
            time_observer_interval_ms = 10
            initial_volume = 3.0
            initial_rate = 0.0
            "#,
        )
        .unwrap();

        let config = SessionConfig::from_toml(&toml);
        assert_eq!(config.time_observer_interval, Duration::from_millis(100));
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(config.initial_rate, 0.5);
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_start_index(2)
            .with_settle_delay(Duration::from_millis(50));
        assert_eq!(config.start_index, 2);
        assert_eq!(config.settle_delay, Duration::from_millis(50));
    }
}
