//! Events emitted by the sync system.
//!
//! Each event is emitted only when the corresponding state actually changed,
//! so consumers (render pipeline, UI) can re-render on receipt without
//! de-duplicating.

use uuid::Uuid;

use super::cache::{ActiveShot, InvalidateReason};

/// Active shot transition (NONE <-> ACTIVE, or ACTIVE(a) -> ACTIVE(b)).
#[derive(Clone, Debug)]
pub struct ActiveShotChangedEvent {
    pub master_frame: i32,
    pub old: Option<ActiveShot>,
    pub new: Option<ActiveShot>,
}

/// Local frame pushed into a shot scene.
#[derive(Clone, Debug)]
pub struct ShotFrameChangedEvent {
    pub scene: Uuid,
    pub local_frame: i32,
}

/// Shot scene's active camera switched to the strip camera.
#[derive(Clone, Debug)]
pub struct ShotCameraChangedEvent {
    pub scene: Uuid,
    pub camera: Uuid,
}

/// A window now shows a different scene.
#[derive(Clone, Debug)]
pub struct WindowSceneChangedEvent {
    pub window: usize,
    pub scene: Uuid,
}

/// Master playhead moved by bidirectional sync or navigation.
#[derive(Clone, Debug)]
pub struct MasterFrameChangedEvent {
    pub scene: Uuid,
    pub frame: i32,
}

#[derive(Clone, Debug)]
pub struct MasterSceneChangedEvent {
    pub scene: Option<Uuid>,
}

/// Resolution cache dropped by an explicit invalidation.
#[derive(Clone, Debug)]
pub struct SyncInvalidatedEvent(pub InvalidateReason);
