//! Studio configuration on disk

use gridstudio::{ConfigError, StudioConfig};
use std::fs;
use std::path::PathBuf;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudioConfig::load_from(&dir.path().join("absent.ron")).unwrap();
    assert_eq!(config, StudioConfig::default());
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.ron");

    let config = StudioConfig {
        tempo_bpm: 96.0,
        loop_playback: false,
        master_volume: 0.8,
        export_dir: Some(PathBuf::from("/tmp/exports")),
        midi_input_port: Some("Keystation".to_string()),
        ..StudioConfig::default()
    };
    config.save_to(&path).unwrap();

    let loaded = StudioConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.tempo().bpm(), 96.0);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(tempo_bpm: 140.0)").unwrap();

    let config = StudioConfig::load_from(&path).unwrap();
    assert_eq!(config.tempo_bpm, 140.0);
    assert_eq!(config.steps_per_bar, 16);
    assert!(config.loop_playback);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(tempo_bpm: \"fast\"").unwrap();
    assert!(matches!(
        StudioConfig::load_from(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn out_of_range_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(tempo_bpm: 5000.0)").unwrap();
    assert!(matches!(
        StudioConfig::load_from(&path),
        Err(ConfigError::Invalid(_))
    ));

    let bad = StudioConfig {
        master_volume: 3.0,
        ..StudioConfig::default()
    };
    assert!(bad.save_to(&dir.path().join("other.ron")).is_err());
}
