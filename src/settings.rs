//! Runner settings
//!
//! Configuration for the headless native runner, read from a JSON file.
//! Missing fields fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::{Tuning, TuningError};

/// Failure reading or parsing a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(#[from] TuningError),
}

/// Headless runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed; derived from the clock when absent
    pub seed: Option<u64>,
    /// Sleep between frames (60 Hz by default)
    pub frame_interval_ms: u64,
    /// Hard stop for sessions that never lose
    pub max_frames: u64,
    /// Scripted player drops once every this many frames
    pub drop_every_frames: u32,
    /// Fire the punch as soon as it is ready
    pub auto_punch: bool,
    /// Name recorded on the leaderboard (blank = anonymous)
    pub player_name: String,
    /// Leaderboard file; none keeps it in memory only
    pub highscores_path: Option<PathBuf>,
    /// Tuning override file
    pub tuning_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            frame_interval_ms: 16,
            max_frames: 60 * 60 * 5,
            drop_every_frames: 45,
            auto_punch: true,
            player_name: String::new(),
            highscores_path: Some(PathBuf::from("pentaro_highscores.json")),
            tuning_path: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Tuning named by `tuning_path`, or the reference configuration
    pub fn tuning(&self) -> Result<Tuning, ConfigError> {
        match &self.tuning_path {
            Some(path) => Tuning::load(path),
            None => {
                let tuning = Tuning::default();
                tuning.validate()?;
                Ok(tuning)
            }
        }
    }
}
