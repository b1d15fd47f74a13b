//! SyncSystem: explicit handle tying settings to an event emitter.
//!
//! Resolution (`resolver.rs`) and propagation (`updater.rs`) are implemented
//! as `impl SyncSystem` blocks in their own files. Every public operation locks
//! the settings once and runs read-cache / decide / recompute / write-cache as
//! one sequence. Events are collected while locked and emitted after the lock
//! is released, so subscribers may query the system from their callbacks.

use std::sync::MutexGuard;

use uuid::Uuid;

use super::cache::InvalidateReason;
use super::event_bus::SyncEventEmitter;
use super::settings::{self, SharedSyncSettings, SyncSettings};
use super::sync_events::*;

/// Caller context for an update: which window the user is working in.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncContext {
    pub window: Option<usize>,
}

impl SyncContext {
    pub fn window(idx: usize) -> Self {
        Self { window: Some(idx) }
    }
}

/// Side effect produced under the settings lock, emitted afterwards.
#[derive(Debug)]
pub(crate) enum Notice {
    ActiveShot(ActiveShotChangedEvent),
    ShotFrame(ShotFrameChangedEvent),
    ShotCamera(ShotCameraChangedEvent),
    WindowScene(WindowSceneChangedEvent),
    MasterFrame(MasterFrameChangedEvent),
    Invalidated(SyncInvalidatedEvent),
}

#[derive(Clone, Debug)]
pub struct SyncSystem {
    settings: SharedSyncSettings,
    emitter: SyncEventEmitter,
}

impl SyncSystem {
    pub fn new(settings: SharedSyncSettings, emitter: SyncEventEmitter) -> Self {
        Self { settings, emitter }
    }

    pub fn settings(&self) -> MutexGuard<'_, SyncSettings> {
        settings::lock(&self.settings)
    }

    pub fn emitter(&self) -> &SyncEventEmitter {
        &self.emitter
    }

    pub fn set_master_scene(&self, scene: Option<Uuid>) {
        self.settings().set_master_scene(scene);
        self.emitter.emit(MasterSceneChangedEvent { scene });
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.settings().set_enabled(enabled);
    }

    /// Explicit invalidation for callers that edited the master timeline
    /// behind the engine's back.
    pub fn invalidate(&self, reason: InvalidateReason) {
        self.settings().invalidate(reason);
        self.emitter.emit(SyncInvalidatedEvent(reason));
    }

    pub(crate) fn flush(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::ActiveShot(e) => self.emitter.emit(e),
                Notice::ShotFrame(e) => self.emitter.emit(e),
                Notice::ShotCamera(e) => self.emitter.emit(e),
                Notice::WindowScene(e) => self.emitter.emit(e),
                Notice::MasterFrame(e) => self.emitter.emit(e),
                Notice::Invalidated(e) => self.emitter.emit(e),
            }
        }
    }
}
