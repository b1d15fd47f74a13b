//! Sync settings store: master scene identity, flags and the resolution cache.
//!
//! `SyncSettings` is normally owned by a `SyncSystem` through a
//! `SharedSyncSettings` handle. `get_sync_settings()` hands out the default
//! process-wide handle (created on first call) for collaborators that have no
//! system at hand; tests build their own handle instead.
//!
//! Persisted fields serialize with the session. The cache and the propagated
//! state are runtime only, so a loaded session always starts invalid.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cache::{ActiveShot, InvalidateReason, ResolutionCache};

pub type SharedSyncSettings = Arc<Mutex<SyncSettings>>;

static SYNC_SETTINGS: Lazy<SharedSyncSettings> = Lazy::new(|| {
    info!("Sync settings created");
    Arc::new(Mutex::new(SyncSettings::default()))
});

/// Process-wide settings handle, created on first access.
pub fn get_sync_settings() -> SharedSyncSettings {
    Arc::clone(&SYNC_SETTINGS)
}

/// Lock a handle, recovering from poisoning (settings stay usable after a
/// panicking subscriber).
pub fn lock(settings: &SharedSyncSettings) -> MutexGuard<'_, SyncSettings> {
    settings.lock().unwrap_or_else(|e| e.into_inner())
}

/// What the updater last pushed out. Used for transition detection and
/// bidirectional boundary crossing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagatedState {
    pub active: Option<ActiveShot>,
    pub last_local_frame: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    master_scene: Option<Uuid>,
    enabled: bool,
    /// Shot frame changes move the master playhead
    pub bidirectional: bool,
    /// Shot preview range follows the active strip
    pub use_preview_range: bool,
    /// All windows showing shots follow, not only the context window
    pub sync_all_windows: bool,
    /// Master editor highlight follows the resolved strip
    pub active_follows_playhead: bool,

    #[serde(skip)]
    cache: ResolutionCache,
    #[serde(skip)]
    state: PropagatedState,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            master_scene: None,
            enabled: false,
            bidirectional: true,
            use_preview_range: false,
            sync_all_windows: false,
            active_follows_playhead: false,
            cache: ResolutionCache::new(),
            state: PropagatedState::default(),
        }
    }
}

impl SyncSettings {
    pub fn master_scene(&self) -> Option<Uuid> {
        self.master_scene
    }

    /// Set master scene identity. Always invalidates: a strip cached for the
    /// old master must never be returned for the new one.
    pub fn set_master_scene(&mut self, scene: Option<Uuid>) {
        if self.master_scene != scene {
            info!("Master scene: {:?} -> {:?}", self.master_scene, scene);
        }
        self.master_scene = scene;
        self.cache.invalidate(InvalidateReason::MasterSceneChanged);
        self.state = PropagatedState::default();
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Timeline sync {}", if enabled { "enabled" } else { "disabled" });
            self.cache.invalidate(InvalidateReason::SyncToggled);
            if !enabled {
                self.state = PropagatedState::default();
            }
        }
        self.enabled = enabled;
    }

    /// Take persisted fields from `loaded` (e.g. after a session load) and
    /// drop everything transient.
    pub fn restore(&mut self, loaded: SyncSettings) {
        self.master_scene = loaded.master_scene;
        self.enabled = loaded.enabled;
        self.bidirectional = loaded.bidirectional;
        self.use_preview_range = loaded.use_preview_range;
        self.sync_all_windows = loaded.sync_all_windows;
        self.active_follows_playhead = loaded.active_follows_playhead;
        self.cache.invalidate(InvalidateReason::SessionLoaded);
        self.state = PropagatedState::default();
    }

    /// Copy of the persisted fields (cache and state start fresh).
    pub fn persisted(&self) -> SyncSettings {
        SyncSettings {
            master_scene: self.master_scene,
            enabled: self.enabled,
            bidirectional: self.bidirectional,
            use_preview_range: self.use_preview_range,
            sync_all_windows: self.sync_all_windows,
            active_follows_playhead: self.active_follows_playhead,
            ..SyncSettings::default()
        }
    }

    pub fn invalidate(&mut self, reason: InvalidateReason) {
        self.cache.invalidate(reason);
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResolutionCache {
        &mut self.cache
    }

    pub fn state(&self) -> PropagatedState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut PropagatedState {
        &mut self.state
    }
}
