//! Engine configuration loaded from TOML.
//!
//! The executable path and search settings live in a value owned by the
//! caller and handed to every request, rather than in process-wide state.

use crate::SkillLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configuration parsed but holds unusable values.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How to launch the engine and how long to let it think.
///
/// # Example
///
/// ```toml
/// path = "/usr/local/bin/stockfish"
/// skill_level = 5
/// movetime_ms = 950
///
/// [options]
/// Threads = "2"
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub path: PathBuf,
    /// Extra command-line arguments for the engine.
    #[serde(default)]
    pub args: Vec<String>,
    /// Skill level used when the caller does not pick one. Defaults to 5.
    #[serde(default = "default_skill_level")]
    pub skill_level: u8,
    /// Search time per move. Defaults to 950 ms.
    #[serde(default = "default_movetime_ms")]
    pub movetime_ms: u64,
    /// Added to the search time to bound the wait for `bestmove`.
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,
    /// How long to wait for the engine to exit after `quit` before killing it.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
    /// Additional `setoption` pairs, sent after the skill level.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_skill_level() -> u8 {
    SkillLevel::default().value()
}

fn default_movetime_ms() -> u64 {
    950
}

fn default_safety_margin_ms() -> u64 {
    500
}

fn default_grace_period_ms() -> u64 {
    500
}

impl EngineConfig {
    /// Creates a configuration with default settings for the given engine.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            skill_level: default_skill_level(),
            movetime_ms: default_movetime_ms(),
            safety_margin_ms: default_safety_margin_ms(),
            grace_period_ms: default_grace_period_ms(),
            options: BTreeMap::new(),
        }
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// [`ConfigError::ParseError`] if it is not valid TOML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("engine path is empty".to_string()));
        }
        if self.movetime_ms == 0 {
            return Err(ConfigError::Invalid("movetime_ms must be positive".to_string()));
        }
        SkillLevel::new(self.skill_level)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// The configured default skill level.
    ///
    /// Falls back to [`SkillLevel::default`] for a config that was never validated.
    pub fn skill(&self) -> SkillLevel {
        SkillLevel::new(self.skill_level).unwrap_or_default()
    }

    pub fn movetime(&self) -> Duration {
        Duration::from_millis(self.movetime_ms)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_millis(self.safety_margin_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
