//! Configuration system for grove.
//!
//! Grove reads a single user-level config file, `grove/config.toml` under the
//! platform config directory:
//!
//! - Linux: `$XDG_CONFIG_HOME/grove/config.toml` or `~/.config/grove/config.toml`
//! - macOS: `$XDG_CONFIG_HOME/grove/config.toml` or `~/.config/grove/config.toml`
//! - Windows: `%APPDATA%\grove\config.toml`
//!
//! ```toml
//! projects-path = "~/Projects"
//! workspaces-path = "~/Workspaces"
//! # Legacy single-root layout; used as the fallback for bare identifiers
//! workspace = "~/code"
//! ```
//!
//! Every value accepts `~` expansion. Environment variables override file
//! values: `GROVE_PROJECTS_PATH`, `GROVE_WORKSPACES_PATH`, `GROVE_WORKSPACE`.
//! `GROVE_CONFIG` (or `--config`) overrides the file location itself.
//!
//! When no config file exists, `projects-path` defaults to `~/Projects` and
//! `workspaces-path` to `~/Workspaces`; `workspace` stays empty.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[cfg(not(test))]
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Process-wide override for the config file location (`--config` flag).
static CONFIG_PATH_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Set the config file path. Call at most once, before the first load.
pub fn set_config_path(path: PathBuf) {
    let _ = CONFIG_PATH_OVERRIDE.set(path);
}

/// Workspace roots consumed by the core. Read-only after loading.
///
/// All three paths are absolute or empty; empty roots make the path
/// resolver leave matching identifiers unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding main git repositories.
    #[serde(default, rename = "projects-path")]
    pub projects_path: PathBuf,

    /// Root directory holding per-project worktrees.
    #[serde(default, rename = "workspaces-path")]
    pub workspaces_path: PathBuf,

    /// Legacy single-root layout; fallback for bare identifiers.
    #[serde(default)]
    pub workspace: PathBuf,
}

impl Config {
    /// A config with every root unset. Mostly useful in tests.
    pub fn empty() -> Self {
        Config::default()
    }

    /// Load from the config file, then apply env overrides and defaults.
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str::<Config>(&raw).map_err(|e| {
                Error::validation(format!(
                    "Malformed config file {}: {e}",
                    crate::path::format_path_for_display(&path)
                ))
                .with_path(path.clone())
                .with_suggestion("Fix the TOML syntax or delete the file to use defaults")
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::home_defaults(),
            Err(e) => {
                return Err(Error::validation(format!(
                    "Cannot read config file {}: {e}",
                    crate::path::format_path_for_display(&path)
                ))
                .with_path(path)
                .with_source(e));
            }
        };

        config.apply_env_overrides();
        config.expand();
        Ok(config)
    }

    fn home_defaults() -> Self {
        let home = crate::path::home_dir().unwrap_or_default();
        if home.as_os_str().is_empty() {
            return Config::empty();
        }
        Config {
            projects_path: home.join("Projects"),
            workspaces_path: home.join("Workspaces"),
            workspace: PathBuf::new(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("GROVE_PROJECTS_PATH") {
            self.projects_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("GROVE_WORKSPACES_PATH") {
            self.workspaces_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("GROVE_WORKSPACE") {
            self.workspace = PathBuf::from(value);
        }
    }

    /// `~` expansion on every root; empty roots stay empty.
    fn expand(&mut self) {
        self.projects_path = expand_tilde(&self.projects_path);
        self.workspaces_path = expand_tilde(&self.workspaces_path);
        self.workspace = expand_tilde(&self.workspace);
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if raw.is_empty() {
        return PathBuf::new();
    }
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Location of the config file: `--config` flag, then `GROVE_CONFIG`, then
/// the platform config directory.
fn config_file_path() -> PathBuf {
    if let Some(path) = CONFIG_PATH_OVERRIDE.get() {
        return path.clone();
    }
    if let Ok(path) = std::env::var("GROVE_CONFIG") {
        return PathBuf::from(path);
    }
    default_config_path()
}

#[cfg(not(test))]
fn default_config_path() -> PathBuf {
    match choose_base_strategy() {
        Ok(strategy) => strategy.config_dir().join("grove").join("config.toml"),
        Err(_) => PathBuf::from("grove-config.toml"),
    }
}

// Tests never read the real user config.
#[cfg(test)]
fn default_config_path() -> PathBuf {
    PathBuf::from("/nonexistent/grove/config.toml")
}
