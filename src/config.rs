//! Preferences file and application paths.
//!
//! `SyncPrefs` holds the user's default sync flags (`seqsync.json`). They are
//! applied to the sync settings at startup; a loaded session overrides them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::{SyncError, SyncSettings};

pub const PREFS_FILE: &str = "seqsync.json";
pub const LOG_FILE: &str = "seqsync.log";
const APP_DIR: &str = "seqsync";
const ENV_CONFIG_DIR: &str = "SEQSYNC_CONFIG_DIR";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (SEQSYNC_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file.
///
/// - Linux: ~/.config/seqsync/{name}
/// - macOS: ~/Library/Application Support/seqsync/{name}
/// - Windows: %APPDATA%\seqsync\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Path to a data file (logs).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Create config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    }
    if data_dir != config_dir && !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    dirs_next::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default sync flags
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPrefs {
    /// Sync on at startup
    pub enabled: bool,
    pub bidirectional: bool,
    pub use_preview_range: bool,
    pub sync_all_windows: bool,
    pub active_follows_playhead: bool,
}

impl Default for SyncPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            bidirectional: true,
            use_preview_range: false,
            sync_all_windows: false,
            active_follows_playhead: false,
        }
    }
}

impl SyncPrefs {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from the configured location; a missing file yields defaults.
    pub fn load_or_default(paths: &PathConfig) -> Result<Self, SyncError> {
        let path = config_file(PREFS_FILE, paths);
        if !path.exists() {
            debug!("No prefs at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let prefs = Self::load(&path)?;
        info!("Prefs loaded: {}", path.display());
        Ok(prefs)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SyncError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn apply(&self, settings: &mut SyncSettings) {
        settings.bidirectional = self.bidirectional;
        settings.use_preview_range = self.use_preview_range;
        settings.sync_all_windows = self.sync_all_windows;
        settings.active_follows_playhead = self.active_follows_playhead;
        settings.set_enabled(self.enabled);
    }
}
