//! Error type for operations that require state the engine cannot invent.
//!
//! "No active shot" during resolution is NOT an error (it is `None`). These
//! variants are for callers that need an active shot, a master scene or a
//! named entity and did not get one.

use uuid::Uuid;

#[derive(Debug)]
pub enum SyncError {
    /// Operation needs an active shot and the playhead is in a gap
    NoActiveShot,
    /// No master scene configured
    NoMasterScene,
    /// Operation needs a context window
    NoWindow,
    SceneNotFound(String),
    ObjectNotFound(String),
    StripNotFound(Uuid),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::NoActiveShot => write!(f, "No active shot at the current frame"),
            SyncError::NoMasterScene => write!(f, "No master scene configured"),
            SyncError::NoWindow => write!(f, "No context window"),
            SyncError::SceneNotFound(name) => write!(f, "Scene not found: {}", name),
            SyncError::ObjectNotFound(name) => write!(f, "Object not found: {}", name),
            SyncError::StripNotFound(uuid) => write!(f, "Strip not found: {}", uuid),
            SyncError::Io(e) => write!(f, "I/O error: {}", e),
            SyncError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Io(e) => Some(e),
            SyncError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e)
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Json(e)
    }
}
