//! Configuration loading and graceful degradation
//!
//! Tests that touch CYTGM_CONFIG are marked #[serial] so they do not race
//! each other on the process environment.

use cytgm_common::config::{resolve_config_path, TomlConfig, CONFIG_ENV_VAR};
use cytgm_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = TomlConfig::load(&path).expect("Missing config must not be fatal");
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_reads_playback_and_logging_tables() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[playback]
settle_delay_ms = 300
time_observer_interval_ms = 250
initial_volume = 0.8
initial_rate = 1.5

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = TomlConfig::load(file.path()).unwrap();
    assert_eq!(config.playback.settle_delay_ms, 300);
    assert_eq!(config.playback.time_observer_interval_ms, 250);
    assert_eq!(config.playback.initial_volume, 0.8);
    assert_eq!(config.playback.initial_rate, 1.5);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[playback]\nsettle_delay_ms = \"soon\"").unwrap();

    match TomlConfig::load(file.path()) {
        Err(Error::Config(msg)) => {
            assert!(msg.contains(&file.path().display().to_string()));
        }
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/srv/cytgm/from-env.toml");
    let path = resolve_config_path(None, CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(path, Some(PathBuf::from("/srv/cytgm/from-env.toml")));
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/srv/cytgm/from-env.toml");
    let path = resolve_config_path(Some(PathBuf::from("/opt/cli.toml").as_path()), CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(path, Some(PathBuf::from("/opt/cli.toml")));
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");
    let path = resolve_config_path(None, CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert_ne!(path, Some(PathBuf::from("   ")));
}

#[test]
#[serial]
fn test_resolve_and_load_through_env_var() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[playback]\nsettle_delay_ms = 42").unwrap();

    env::set_var(CONFIG_ENV_VAR, file.path());
    let config = TomlConfig::resolve_and_load(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.unwrap().playback.settle_delay_ms, 42);
}
