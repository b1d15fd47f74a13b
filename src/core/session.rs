//! Session file: project plus persisted sync settings in one JSON document.
//!
//! The resolution cache and propagated state are never written. Loading a
//! session goes through `SyncSettings::restore`, which invalidates the cache.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use super::error::SyncError;
use super::settings::SyncSettings;
use super::system::SyncSystem;
use crate::entities::Project;

#[derive(Debug, Deserialize)]
pub struct Session {
    pub project: Project,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Serialize)]
struct SessionRef<'a> {
    project: &'a Project,
    sync: &'a SyncSettings,
}

/// Force a `.json` extension.
fn json_path(path: &Path) -> PathBuf {
    if path.extension().and_then(|s| s.to_str()) != Some("json") {
        path.with_extension("json")
    } else {
        path.to_path_buf()
    }
}

impl Session {
    /// Write `project` and the persisted part of `sync`'s settings.
    /// Returns the path actually written.
    pub fn save<P: AsRef<Path>>(path: P, project: &Project, sync: &SyncSystem) -> Result<PathBuf, SyncError> {
        let settings = sync.settings().persisted();
        let json = serde_json::to_string_pretty(&SessionRef {
            project,
            sync: &settings,
        })?;
        let path = json_path(path.as_ref());
        fs::write(&path, json)?;
        info!("Session saved: {}", path.display());
        Ok(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let json = fs::read_to_string(path.as_ref())?;
        let session: Session = serde_json::from_str(&json)?;
        info!(
            "Session loaded: {} ({} scenes)",
            path.as_ref().display(),
            session.project.scenes.len()
        );
        Ok(session)
    }

    /// Hand the sync settings to `sync` (invalidating its cache) and return
    /// the project.
    pub fn apply(self, sync: &SyncSystem) -> Project {
        sync.settings().restore(self.sync);
        self.project
    }
}
