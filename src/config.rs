use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.json";

/// Persisted user selection — port pair and theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_port: String,
    pub output_port: String,
    pub theme: String,
}

/// Result of checking a loaded config against the ports present right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoad {
    /// Both saved ports are available.
    Ready { input: String, output: String },
    /// At least one saved port is missing (or none was saved).
    StalePorts,
}

impl AppConfig {
    pub fn resolve(&self, inputs: &[String], outputs: &[String]) -> ConfigLoad {
        if inputs.contains(&self.input_port) && outputs.contains(&self.output_port) {
            ConfigLoad::Ready {
                input: self.input_port.clone(),
                output: self.output_port.clone(),
            }
        } else {
            ConfigLoad::StalePorts
        }
    }
}

/// Reads and writes [`AppConfig`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config.json` in the platform config directory.
    pub fn default_location() -> Self {
        let path = if let Some(dirs) = directories::ProjectDirs::from("org", "ridi", "RIDI") {
            dirs.config_dir().join(CONFIG_FILE)
        } else {
            // Fallback
            PathBuf::from(CONFIG_FILE)
        };
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<AppConfig>, ConfigError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = serde_json::from_str(&data)?;
        log::info!("[Config] Loaded {}", self.path.display());
        Ok(Some(config))
    }

    /// Overwrites whatever is on disk.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, data)?;
        log::info!("[Config] Saved {}", self.path.display());
        Ok(())
    }
}
