//! Centralized directory and file paths for mycc.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/mycc/` | `~/.config/mycc/` |
//! | Data (logs) | `~/Library/Application Support/mycc/` | `~/.local/share/mycc/` |
//!
//! Task files live in the project working directory, not here:
//! [`tasks_file`] and [`history_file`] resolve them under a given `cwd`.
//!
//! # Environment Overrides
//!
//! - `MYCC_CONFIG_DIR` overrides [`config_dir`]
//! - `MYCC_DATA_DIR` overrides [`data_dir`]

use std::path::{Path, PathBuf};

/// Task table path relative to the working directory.
pub const TASKS_FILE: &str = ".claude/skills/scheduler/tasks.md";

/// Firing history path relative to the working directory.
pub const HISTORY_FILE: &str = ".claude/skills/scheduler/history.md";

/// Application config directory, holding `config.toml`.
///
/// Resolves to `dirs::config_dir()/mycc/` by default. Override with
/// the `MYCC_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MYCC_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("mycc"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mycc-config"))
}

/// Application data root directory.
///
/// Resolves to `dirs::data_dir()/mycc/` by default. Override with
/// the `MYCC_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MYCC_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("mycc"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mycc-data"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Default task table location under `cwd`.
#[must_use]
pub fn tasks_file(cwd: &Path) -> PathBuf {
    cwd.join(TASKS_FILE)
}

/// Default firing history location under `cwd`.
#[must_use]
pub fn history_file(cwd: &Path) -> PathBuf {
    cwd.join(HISTORY_FILE)
}
