//! Configuration types for the mycc daemon.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration, loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MyccConfig {
    /// Task scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Local agent invocation settings.
    pub agent: AgentConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Task scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether the scheduler runs at all.
    pub enabled: bool,
    /// Seconds between ticks. The matcher's ±2 minute tolerance assumes the
    /// default of 60; longer periods can miss due times.
    pub tick_interval_secs: u64,
    /// Task table location relative to the working directory.
    pub tasks_file: PathBuf,
    /// Firing history location relative to the working directory.
    pub history_file: PathBuf,
    /// Append a row to the history file for every firing.
    pub record_history: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_secs: 60,
            tasks_file: crate::mycc_dirs::TASKS_FILE.into(),
            history_file: crate::mycc_dirs::HISTORY_FILE.into(),
            record_history: true,
        }
    }
}

/// How the local agent CLI is invoked for a fired task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Executable name or path.
    pub command: String,
    /// Arguments placed before the prompt.
    pub args: Vec<String>,
    /// Kill the agent after this many seconds. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_owned(),
            args: vec![
                "--print".to_owned(),
                "--permission-mode".to_owned(),
                "bypassPermissions".to_owned(),
            ],
            timeout_secs: None,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily rolling log file under the data directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mycc=info".to_owned(),
            file: false,
        }
    }
}

impl MyccConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::MyccError::Config(e.to_string()))
    }

    /// Load from `path` if it exists, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> crate::error::Result<Self> {
        match Self::from_file(path) {
            Err(crate::error::MyccError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MyccError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::mycc_dirs::config_dir().join("config.toml")
    }
}
