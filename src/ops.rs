//! User-facing operators built on the sync system.
//!
//! Each operator validates what it needs (master scene, active shot, named
//! entity) and returns `SyncError` when it is missing. Edits to the master
//! timeline are followed by an explicit invalidation and a forced update.

use std::fmt::Write as _;

use indexmap::IndexMap;
use log::{debug, info};
use uuid::Uuid;

use crate::core::{
    ActiveShot, InvalidateReason, SyncContext, SyncError, SyncSystem, find_local_strip, local_range,
    sync_events::ShotCameraChangedEvent,
};
use crate::entities::{Project, Strip};

fn require_master(sync: &SyncSystem) -> Result<Uuid, SyncError> {
    sync.settings().master_scene().ok_or(SyncError::NoMasterScene)
}

fn require_active(sync: &SyncSystem, project: &Project) -> Result<(Uuid, ActiveShot), SyncError> {
    let master = require_master(sync)?;
    let active = sync.get_sync_master_strip(project, true).ok_or(SyncError::NoActiveShot)?;
    Ok((master, active))
}

/// Go to `local` in the context window's scene.
///
/// If another strip of the master plays that scene at `local`, the master
/// playhead jumps to it first. The scene frame change then runs through
/// bidirectional sync.
pub fn navigate(sync: &SyncSystem, project: &mut Project, ctx: &SyncContext, local: i32) -> Result<(), SyncError> {
    let master = require_master(sync)?;
    let window = ctx.window.and_then(|idx| project.window(idx)).ok_or(SyncError::NoWindow)?;
    let scene = window.scene;

    let active = sync.settings().state().active.map(|a| a.strip);
    let jump = find_local_strip(project, master, scene, local, active)
        .filter(|strip| Some(strip.uuid()) != active)
        .map(|strip| strip.frame_final_start());

    if let Some(frame) = jump {
        debug!("navigate: master -> {} for local {}", frame, local);
        if let Some(master_scene) = project.scene_mut(master) {
            master_scene.set_frame_current(frame);
        }
        sync.sync_system_update(project, ctx, false);
    }

    let target = project
        .scene_mut(scene)
        .ok_or_else(|| SyncError::SceneNotFound(scene.to_string()))?;
    if target.set_frame_current(local) {
        sync.sync_from_shot(project, ctx, scene);
    }
    Ok(())
}

/// Set the active strip's camera and make it the shot scene's camera.
/// `None` clears the strip camera only.
pub fn active_shot_camera_set(
    sync: &SyncSystem,
    project: &mut Project,
    ctx: &SyncContext,
    camera: Option<&str>,
) -> Result<(), SyncError> {
    let (master, active) = require_active(sync, project)?;
    let camera = match camera {
        Some(name) => {
            let object = project
                .object_by_name(name)
                .filter(|o| o.is_camera())
                .ok_or_else(|| SyncError::ObjectNotFound(name.to_string()))?;
            Some(object.uuid)
        }
        None => None,
    };

    project
        .strip_mut(master, active.strip)
        .ok_or(SyncError::StripNotFound(active.strip))?
        .set_scene_camera(camera);

    if let Some(camera) = camera {
        let scene = project
            .scene_mut(active.scene)
            .ok_or_else(|| SyncError::SceneNotFound(active.scene.to_string()))?;
        if scene.set_camera(Some(camera)) {
            sync.emitter().emit(ShotCameraChangedEvent {
                scene: active.scene,
                camera,
            });
        }
    }
    info!("Active shot camera: {:?}", camera);

    sync.invalidate(InvalidateReason::CameraReassigned);
    sync.sync_system_update(project, ctx, true);
    Ok(())
}

/// Point the active strip at another scene. Returns the new scene's UUID.
///
/// The strip keeps its camera if the new scene links it, else it takes the
/// new scene's camera.
pub fn active_shot_scene_set(
    sync: &SyncSystem,
    project: &mut Project,
    ctx: &SyncContext,
    scene_name: &str,
) -> Result<Uuid, SyncError> {
    let (master, active) = require_active(sync, project)?;
    let new_scene = project
        .scene_by_name(scene_name)
        .ok_or_else(|| SyncError::SceneNotFound(scene_name.to_string()))?;
    let (scene_uuid, src_start, scene_camera) = (new_scene.uuid(), new_scene.frame_start(), new_scene.camera());

    let keep_camera = {
        let strip = project.strip(master, active.strip).ok_or(SyncError::StripNotFound(active.strip))?;
        strip.scene_camera().filter(|cam| new_scene.has_object(*cam))
    };

    let strip = project
        .strip_mut(master, active.strip)
        .ok_or(SyncError::StripNotFound(active.strip))?;
    strip.set_scene(scene_uuid, src_start);
    strip.set_scene_camera(keep_camera.or(scene_camera));
    info!("Strip {} now plays {}", strip.name(), scene_name);

    sync.invalidate(InvalidateReason::SceneReassigned);
    sync.sync_system_update(project, ctx, true);
    Ok(scene_uuid)
}

/// Flip sync on/off. Enabling forces an update. Returns the new state.
pub fn toggle_sync(sync: &SyncSystem, project: &mut Project, ctx: &SyncContext) -> bool {
    let enabled = !sync.settings().enabled();
    sync.set_enabled(enabled);
    if enabled {
        sync.sync_system_update(project, ctx, true);
    }
    enabled
}

/// Which master strips show `object_name`, grouped by scene.
pub fn object_usage_report(sync: &SyncSystem, project: &Project, object_name: &str) -> Result<String, SyncError> {
    let master = require_master(sync)?;
    let object = project
        .object_by_name(object_name)
        .ok_or_else(|| SyncError::ObjectNotFound(object_name.to_string()))?;
    let master_scene = project
        .scene(master)
        .ok_or_else(|| SyncError::SceneNotFound(master.to_string()))?;

    let mut strips: Vec<&Strip> = master_scene.strips().iter().collect();
    strips.sort_by_key(|s| (s.frame_final_start(), s.channel()));

    let mut usage: IndexMap<Uuid, Vec<&Strip>> = IndexMap::new();
    for strip in strips {
        let Some(scene) = strip.scene() else {
            continue;
        };
        if project.scene(scene).is_some_and(|s| s.has_object(object.uuid)) {
            usage.entry(scene).or_default().push(strip);
        }
    }

    let mut report = String::new();
    if usage.is_empty() {
        let _ = writeln!(report, "'{}' is not used by any shot", object.name);
        return Ok(report);
    }
    let _ = writeln!(report, "'{}' used in {} scene(s):", object.name, usage.len());
    for (scene, strips) in &usage {
        let name = project.scene(*scene).map(|s| s.name()).unwrap_or("?");
        let _ = writeln!(report, "  {}", name);
        for strip in strips {
            let (first, last) = local_range(strip);
            let _ = writeln!(
                report,
                "    {} [{}-{}) ch{} local {}-{}",
                strip.name(),
                strip.frame_final_start(),
                strip.frame_final_end(),
                strip.channel(),
                first,
                last
            );
        }
    }
    Ok(report)
}
