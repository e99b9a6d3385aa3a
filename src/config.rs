//! Application configuration loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct GesturepilotConfig {
    /// Minimum milliseconds between accepted gesture transitions.
    pub gesture_cooldown_ms: u64,

    /// Pause between injected key events in milliseconds, matched to the
    /// target application's input polling rate.
    pub key_event_pause_ms: u64,

    pub detector: DetectorConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct DetectorConfig {
    /// Program producing the landmark stream on stdout.
    pub command: String,
    pub args: Vec<String>,
    pub min_detection_confidence: f32,
}

impl Default for GesturepilotConfig {
    fn default() -> Self {
        Self {
            gesture_cooldown_ms: 500,
            key_event_pause_ms: 200,
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["hand_detector.py".to_string()],
            min_detection_confidence: 0.7,
        }
    }
}

impl GesturepilotConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gesturepilot").join("config.toml"))
    }

    /// Writes a default configuration file if none exists yet.
    pub fn ensure_default_config() -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        match toml::to_string_pretty(&Self::default()) {
            Ok(content) => {
                fs::write(&path, content)?;
                info!("Wrote default configuration to {:?}", path);
            }
            Err(e) => warn!("Could not serialize default configuration: {}", e),
        }
        Ok(())
    }

    /// Loads the configuration, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    debug!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Invalid configuration in {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                debug!("No configuration at {:?} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }
}
