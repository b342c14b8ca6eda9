// Configuration - studio settings persisted as RON
//
// Missing file: defaults. Malformed or invalid file: error, the caller logs it
// and falls back to defaults.

use crate::sequencer::timeline::{MAX_BPM, MIN_BPM, STEPS_PER_BAR, Tempo};
use log::{info, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gridstudio";
const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No configuration directory on this system")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub tempo_bpm: f64,
    pub steps_per_bar: usize,
    /// Grid panels loop their bar while playing
    pub loop_playback: bool,
    pub master_volume: f32,
    pub waveform_width: usize,
    pub waveform_height: f32,
    /// Where exports are written; the download directory when unset
    pub export_dir: Option<PathBuf>,
    /// Hardware MIDI input port; the first available port when unset
    pub midi_input_port: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 120.0,
            steps_per_bar: STEPS_PER_BAR,
            loop_playback: true,
            master_volume: 0.5,
            waveform_width: 600,
            waveform_height: 80.0,
            export_dir: None,
            midi_input_port: None,
        }
    }
}

impl StudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BPM..=MAX_BPM).contains(&self.tempo_bpm) {
            return Err(ConfigError::Invalid(format!(
                "tempo_bpm {} outside {}..={}",
                self.tempo_bpm, MIN_BPM, MAX_BPM
            )));
        }
        if self.steps_per_bar == 0 {
            return Err(ConfigError::Invalid("steps_per_bar must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::Invalid(format!(
                "master_volume {} outside 0..=1",
                self.master_volume
            )));
        }
        if self.waveform_width == 0 || self.waveform_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "waveform size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tempo(&self) -> Tempo {
        Tempo::try_new(self.tempo_bpm).unwrap_or_default()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `<config dir>/gridstudio/config.ron`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config: Self = ron::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, PrettyConfig::default())?;
        fs::write(path, text)?;
        info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        let loaded = Self::default_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!("Config not loaded ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }
}
