//! Update propagation: push master time into the active shot and its nested
//! timelines, and (bidirectional) shot time back into the master.
//!
//! State machine per master: `None` or `Some(ActiveShot)`. Every transition
//! propagates; staying only pushes the local frame when it moved. All writes
//! go through change-detecting setters so a repeated call with unchanged
//! inputs has no side effects and emits nothing.

use std::collections::HashSet;

use log::{debug, trace, warn};
use uuid::Uuid;

use super::cache::{ActiveShot, InvalidateReason};
use super::remap::{local_frame, local_range, remap_frame_value};
use super::resolver::{resolve_master, resolve_nested};
use super::settings::SyncSettings;
use super::sync_events::*;
use super::system::{Notice, SyncContext, SyncSystem};
use crate::entities::Project;

/// Move a scene's playhead, noting the change.
fn push_frame(project: &mut Project, scene: Uuid, frame: i32, notices: &mut Vec<Notice>) {
    let Some(target) = project.scene_mut(scene) else {
        warn!("push_frame: scene {} not in project", scene);
        return;
    };
    if target.set_frame_current(frame) {
        trace!("{} -> frame {}", target.name(), frame);
        notices.push(Notice::ShotFrame(ShotFrameChangedEvent { scene, local_frame: frame }));
    }
}

/// Windows eligible for a scene switch: the context window, or all windows
/// with `sync_all_windows`, restricted to those showing the master, one of
/// its shots or the previously active shot.
fn synced_windows(
    project: &Project,
    master: Uuid,
    previous: Option<ActiveShot>,
    ctx: &SyncContext,
    all: bool,
) -> Vec<usize> {
    let mut synced: HashSet<Uuid> = HashSet::new();
    synced.insert(master);
    synced.extend(previous.map(|p| p.scene));
    if let Some(scene) = project.scene(master) {
        synced.extend(scene.strips().iter().filter_map(|s| s.scene()));
    }

    let candidates: Vec<usize> = if all {
        (0..project.windows.len()).collect()
    } else {
        ctx.window.into_iter().collect()
    };
    candidates
        .into_iter()
        .filter(|&idx| project.window(idx).is_some_and(|w| synced.contains(&w.scene)))
        .collect()
}

/// Side effects of entering `shot`: camera, windows, active strip, preview range.
fn enter_shot(
    project: &mut Project,
    settings: &SyncSettings,
    master: Uuid,
    previous: Option<ActiveShot>,
    shot: ActiveShot,
    ctx: &SyncContext,
    notices: &mut Vec<Notice>,
) {
    let Some(strip) = project.strip(master, shot.strip) else {
        return;
    };
    let camera = strip.scene_camera();
    let range = local_range(strip);

    let windows = synced_windows(project, master, previous, ctx, settings.sync_all_windows);
    for idx in windows {
        let window = &mut project.windows[idx];
        if window.scene != shot.scene {
            window.scene = shot.scene;
            notices.push(Notice::WindowScene(WindowSceneChangedEvent {
                window: idx,
                scene: shot.scene,
            }));
        }
    }

    if settings.active_follows_playhead {
        if let Some(editor) = project.scene_mut(master).and_then(|s| s.sequence_editor.as_mut()) {
            editor.set_active_strip(Some(shot.strip));
        }
    }

    let Some(scene) = project.scene_mut(shot.scene) else {
        warn!("Active strip {} points at missing scene {}", shot.strip, shot.scene);
        return;
    };
    if let Some(camera) = camera {
        if scene.set_camera(Some(camera)) {
            notices.push(Notice::ShotCamera(ShotCameraChangedEvent {
                scene: shot.scene,
                camera,
            }));
        }
    }
    if settings.use_preview_range {
        scene.set_preview_range(Some(range));
    }
}

impl SyncSystem {
    /// Propagate the master frame to the active shot (and nested shots).
    ///
    /// `force` bypasses the resolution cache. No-op when sync is disabled or
    /// no master scene is set.
    pub fn sync_system_update(&self, project: &mut Project, ctx: &SyncContext, force: bool) {
        let mut notices = Vec::new();
        {
            let mut settings = self.settings();
            if !settings.enabled() {
                return;
            }
            let Some(master) = settings.master_scene() else {
                return;
            };
            let Some(master_scene) = project.scene_mut(master) else {
                warn!("Master scene {} not in project", master);
                return;
            };
            let master_frame = master_scene.frame_current();

            if let Some(editor) = master_scene.sequence_editor.as_mut() {
                if editor.is_dirty() {
                    editor.clear_dirty();
                    settings.invalidate(InvalidateReason::StripsEdited);
                    notices.push(Notice::Invalidated(SyncInvalidatedEvent(InvalidateReason::StripsEdited)));
                }
            }

            let resolved = resolve_master(&mut settings, project, !force);
            let previous = settings.state().active;

            if resolved != previous {
                debug!("Active shot @{}: {:?} -> {:?}", master_frame, previous, resolved);
                if let Some(shot) = resolved {
                    enter_shot(project, &settings, master, previous, shot, ctx, &mut notices);
                }
                settings.state_mut().active = resolved;
                notices.push(Notice::ActiveShot(ActiveShotChangedEvent {
                    master_frame,
                    old: previous,
                    new: resolved,
                }));
            }

            let local = resolved.and_then(|shot| {
                project
                    .strip(master, shot.strip)
                    .map(|strip| (shot.scene, local_frame(master_frame, strip)))
            });
            settings.state_mut().last_local_frame = local.map(|(_, frame)| frame);

            // A strip playing the master itself must not move the master playhead
            if let Some((scene, frame)) = local.filter(|(scene, _)| *scene != master) {
                push_frame(project, scene, frame, &mut notices);
                let nested: Vec<(Uuid, i32)> = resolve_nested(project, scene, frame, None)
                    .into_iter()
                    .take_while(|level| level.shot.scene != master)
                    .map(|level| (level.shot.scene, level.local_frame))
                    .collect();
                for (scene, frame) in nested {
                    push_frame(project, scene, frame, &mut notices);
                }
            }
        }
        self.flush(notices);
    }

    /// Bidirectional sync after `scene`'s playhead moved.
    ///
    /// Returns true if the master playhead was moved.
    pub fn sync_from_shot(&self, project: &mut Project, ctx: &SyncContext, scene: Uuid) -> bool {
        let (master, target) = {
            let mut settings = self.settings();
            if !settings.enabled() || !settings.bidirectional {
                return false;
            }
            let Some(master) = settings.master_scene() else {
                return false;
            };
            let state = settings.state();
            let Some(active) = state.active.filter(|a| a.scene == scene) else {
                return false;
            };
            let (Some(strip), Some(shot_scene)) = (project.strip(master, active.strip), project.scene(scene)) else {
                return false;
            };

            let local = shot_scene.frame_current();
            let (first, last) = local_range(strip);
            let target = if (first..=last).contains(&local) {
                settings.state_mut().last_local_frame = Some(local);
                remap_frame_value(local, strip)
            } else if local == last + 1 && state.last_local_frame == Some(last) {
                strip.frame_final_end()
            } else if local == first - 1 && state.last_local_frame == Some(first) {
                strip.frame_final_start() - 1
            } else {
                trace!("sync_from_shot: local {} outside {}..={}, master untouched", local, first, last);
                return false;
            };
            (master, target)
        };

        let Some(master_scene) = project.scene_mut(master) else {
            return false;
        };
        if !master_scene.set_frame_current(target) {
            return false;
        }
        debug!("Master frame <- {} (from shot {})", target, scene);
        self.flush(vec![Notice::MasterFrame(MasterFrameChangedEvent { scene: master, frame: target })]);
        self.sync_system_update(project, ctx, false);
        true
    }
}
