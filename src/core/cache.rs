//! Resolution cache: last known active shot for a master frame.
//!
//! The cache is an explicit object with a single invalidation entry point,
//! `invalidate(reason)`. Callers that know the master timeline changed in a
//! way the frame number cannot reveal must call it:
//!
//! | Reason               | Emitted by                                        |
//! |----------------------|---------------------------------------------------|
//! | `MasterSceneChanged` | `SyncSettings::set_master_scene`                  |
//! | `StripsEdited`       | resolver, while the master editor is dirty        |
//! | `SceneReassigned`    | `ops::active_shot_scene_set`                      |
//! | `CameraReassigned`   | `ops::active_shot_camera_set`                     |
//! | `SessionLoaded`      | `SyncSettings::restore` after a session load      |
//! | `SyncToggled`        | `SyncSettings::set_enabled`                       |
//!
//! A frame different from `cache_frame` is an implicit miss and needs no call.
//!
//! `last_strip` survives invalidation: it is the sticky tie-break hint, not a
//! cached answer, so it never short-circuits a scan. It is cleared only when
//! the master scene changes.

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use uuid::Uuid;

/// Resolved active shot: strip on the master timeline and the scene it plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActiveShot {
    pub strip: Uuid,
    pub scene: Uuid,
}

/// Why the cache was invalidated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidateReason {
    MasterSceneChanged,
    StripsEdited,
    SceneReassigned,
    CameraReassigned,
    SessionLoaded,
    SyncToggled,
}

/// Cache counters. `scans` counts full strip enumerations.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    scans: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 { 0.0 } else { self.hits() as f64 / total as f64 }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.scans.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    resolved: Option<ActiveShot>,
    cache_frame: i32,
    valid: bool,
    last_strip: Option<Uuid>,
    stats: CacheStats,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer for `frame`, if valid. `Some(None)` means "cached gap".
    pub fn lookup(&self, frame: i32) -> Option<Option<ActiveShot>> {
        if self.valid && self.cache_frame == frame {
            self.stats.record_hit();
            Some(self.resolved)
        } else {
            self.stats.record_miss();
            None
        }
    }

    /// Store a fresh resolution for `frame`.
    pub fn store(&mut self, frame: i32, resolved: Option<ActiveShot>) {
        self.resolved = resolved;
        self.cache_frame = frame;
        self.valid = true;
        if let Some(shot) = resolved {
            self.last_strip = Some(shot.strip);
        }
    }

    /// Single invalidation entry point.
    pub fn invalidate(&mut self, reason: InvalidateReason) {
        if self.valid {
            debug!("resolution cache invalidated: {:?} (frame {})", reason, self.cache_frame);
        }
        self.valid = false;
        self.resolved = None;
        if reason == InvalidateReason::MasterSceneChanged {
            self.last_strip = None;
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Last resolved strip, kept across invalidation for sticky tie-break
    pub fn sticky_strip(&self) -> Option<Uuid> {
        self.last_strip
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
