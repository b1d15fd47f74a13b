//! Master-strip resolver: which shot is active at a frame.
//!
//! Single-level rule (`find_strip_at`):
//! - candidates are playable strips (not muted, channel not muted, has a
//!   scene) whose half-open interval contains the frame
//! - highest channel wins
//! - on an equal channel the sticky strip (last resolved) wins, else the
//!   first in (channel, frame_final_start) order
//!
//! Nested timelines are resolved one level at a time: the winning strip's
//! local frame becomes the query frame inside the child's sequence editor.
//! Descent stops at a level with no match, at an already visited scene
//! (cycle) or at `MAX_NESTING_DEPTH`.

use std::collections::HashSet;

use log::{trace, warn};
use uuid::Uuid;

use super::cache::{ActiveShot, InvalidateReason};
use super::remap::{local_frame, local_range};
use super::settings::SyncSettings;
use super::system::SyncSystem;
use crate::entities::{Project, SequenceEditor, Strip};

pub const MAX_NESTING_DEPTH: usize = 16;

/// One level of a nested resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLevel {
    /// Scene whose editor holds the strip
    pub parent: Uuid,
    pub shot: ActiveShot,
    /// Query frame in parent time
    pub parent_frame: i32,
    /// Same instant in the shot's local time
    pub local_frame: i32,
}

fn shot_of(strip: &Strip) -> Option<ActiveShot> {
    strip.scene().map(|scene| ActiveShot { strip: strip.uuid(), scene })
}

/// Active strip of `editor` at `frame` (single level, no cache).
pub fn find_strip_at(editor: &SequenceEditor, frame: i32, sticky: Option<Uuid>) -> Option<&Strip> {
    let mut best: Option<&Strip> = None;
    for strip in editor.sorted() {
        if !editor.is_playable(strip) || !strip.contains(frame) {
            continue;
        }
        best = match best {
            None => Some(strip),
            Some(b) if strip.channel() > b.channel() => Some(strip),
            Some(b) if strip.channel() == b.channel()
                && sticky == Some(strip.uuid())
                && sticky != Some(b.uuid()) => Some(strip),
            keep => keep,
        };
    }
    best
}

/// Strip of `master` playing `scene` whose local range contains `local`.
/// `prefer` wins among several candidates.
pub fn find_local_strip(project: &Project, master: Uuid, scene: Uuid, local: i32, prefer: Option<Uuid>) -> Option<&Strip> {
    let editor = project.scene(master)?.sequence_editor.as_ref()?;
    let candidates: Vec<&Strip> = editor
        .sorted()
        .into_iter()
        .filter(|s| s.scene() == Some(scene) && editor.is_playable(s))
        .filter(|s| {
            let (first, last) = local_range(s);
            first <= local && local <= last
        })
        .collect();
    candidates
        .iter()
        .find(|s| Some(s.uuid()) == prefer)
        .or_else(|| candidates.first())
        .copied()
}

/// Descend from `root` at `frame`. `sticky` applies to the first level only.
pub fn resolve_nested(project: &Project, root: Uuid, frame: i32, sticky: Option<Uuid>) -> Vec<ResolvedLevel> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut parent = root;
    let mut frame = frame;
    let mut sticky = sticky;

    while chain.len() < MAX_NESTING_DEPTH {
        if !visited.insert(parent) {
            warn!("resolve_nested: cycle through scene {}, stopping", parent);
            break;
        }
        let Some(editor) = project.scene(parent).and_then(|s| s.sequence_editor.as_ref()) else {
            break;
        };
        let Some(strip) = find_strip_at(editor, frame, sticky.take()) else {
            break;
        };
        let Some(shot) = shot_of(strip) else {
            break;
        };
        let local = local_frame(frame, strip);
        chain.push(ResolvedLevel {
            parent,
            shot,
            parent_frame: frame,
            local_frame: local,
        });
        parent = shot.scene;
        frame = local;
    }
    chain
}

/// Cache-aware master resolution. Caller holds the settings lock.
pub(crate) fn resolve_master(settings: &mut SyncSettings, project: &Project, use_cache: bool) -> Option<ActiveShot> {
    let master_uuid = settings.master_scene()?;
    let Some(master) = project.scene(master_uuid) else {
        warn!("Master scene {} not in project", master_uuid);
        return None;
    };
    let frame = master.frame_current();

    // Dirty stays set until the updater clears it, so every query until then rescans
    let edited = master.sequence_editor.as_ref().is_some_and(|ed| ed.is_dirty());
    if edited {
        settings.invalidate(InvalidateReason::StripsEdited);
    }

    if use_cache && !edited {
        if let Some(cached) = settings.cache().lookup(frame) {
            return cached;
        }
    }

    settings.cache().stats().record_scan();
    let sticky = settings.cache().sticky_strip();
    let resolved = master
        .sequence_editor
        .as_ref()
        .and_then(|ed| find_strip_at(ed, frame, sticky))
        .and_then(shot_of);
    trace!("resolve_master: frame={} -> {:?}", frame, resolved);

    settings.cache_mut().store(frame, resolved);
    resolved
}

impl SyncSystem {
    /// Active shot on the master timeline at its current frame.
    /// `None` when in a gap or when no master scene is configured.
    pub fn get_sync_master_strip(&self, project: &Project, use_cache: bool) -> Option<ActiveShot> {
        let mut settings = self.settings();
        resolve_master(&mut settings, project, use_cache)
    }

    /// Full chain from the master down through nested shot timelines.
    pub fn resolve_chain(&self, project: &Project, use_cache: bool) -> Vec<ResolvedLevel> {
        let mut settings = self.settings();
        let Some(first) = resolve_master(&mut settings, project, use_cache) else {
            return Vec::new();
        };
        let Some(master) = settings.master_scene() else {
            return Vec::new();
        };
        drop(settings);

        let frame = project.scene(master).map(|s| s.frame_current()).unwrap_or(0);
        // Re-run level 0 pinned to the resolved strip so the chain agrees with the cache
        resolve_nested(project, master, frame, Some(first.strip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::Setup;
    use crate::entities::Scene;

    /// A (ch 1, 1..=100, X) and B (ch 2, 50..=150, Y)
    fn overlap_setup() -> (Setup, ActiveShot, ActiveShot) {
        let mut setup = Setup::new();
        let a = setup.add_shot("A", 1, 1, 100);
        let b = setup.add_shot("B", 2, 50, 101);
        // As after a host update
        setup.editor_mut().clear_dirty();
        (setup, a, b)
    }

    #[test]
    fn test_scenario_channel_priority_and_gap() {
        let (mut setup, a, b) = overlap_setup();
        setup.set_master_frame(30);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(a));
        setup.set_master_frame(75);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(b));
        setup.set_master_frame(200);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), None);
    }

    #[test]
    fn test_interval_containment_half_open() {
        let (mut setup, a, b) = overlap_setup();
        let (start, end) = {
            let s = setup.strip(a.strip);
            (s.frame_final_start(), s.frame_final_end())
        };
        for frame in start..50 {
            setup.set_master_frame(frame);
            assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(a), "frame {}", frame);
        }
        // B owns 50..151 despite A covering up to 100
        setup.set_master_frame(end - 1);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(b));
        setup.set_master_frame(150);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(b));
        setup.set_master_frame(151);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), None);
    }

    #[test]
    fn test_cache_hit_skips_scan() {
        let (mut setup, a, _) = overlap_setup();
        setup.set_master_frame(30);

        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));
        let scans = setup.sync.settings().cache().stats().scans();
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));
        assert_eq!(setup.sync.settings().cache().stats().scans(), scans);

        // Different frame is an implicit miss
        setup.set_master_frame(31);
        setup.sync.get_sync_master_strip(&setup.project, true);
        assert_eq!(setup.sync.settings().cache().stats().scans(), scans + 1);

        // use_cache=false always scans
        setup.sync.get_sync_master_strip(&setup.project, false);
        assert_eq!(setup.sync.settings().cache().stats().scans(), scans + 2);
    }

    #[test]
    fn test_explicit_invalidate_forces_scan() {
        let (mut setup, _, _) = overlap_setup();
        setup.set_master_frame(30);
        setup.sync.get_sync_master_strip(&setup.project, true);
        let scans = setup.sync.settings().cache().stats().scans();

        setup.sync.invalidate(InvalidateReason::StripsEdited);
        setup.sync.get_sync_master_strip(&setup.project, true);
        assert_eq!(setup.sync.settings().cache().stats().scans(), scans + 1);
    }

    #[test]
    fn test_strip_edit_refuses_cached_answer() {
        let (mut setup, a, _) = overlap_setup();
        setup.set_master_frame(10);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));

        // A slides off the playhead; no updater run in between
        setup.strip_mut(a.strip).move_by(100);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), None);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), None);
    }

    #[test]
    fn test_channel_change_seen_through_cache() {
        let (mut setup, a, b) = overlap_setup();
        setup.set_master_frame(75);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(b));

        setup.strip_mut(a.strip).set_channel(3);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));
    }

    #[test]
    fn test_removed_strip_not_returned_from_cache() {
        let (mut setup, a, b) = overlap_setup();
        setup.set_master_frame(75);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(b));

        let removed = setup.editor_mut().remove_strip(b.strip).map(|s| s.uuid());
        assert_eq!(removed, Some(b.strip));
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));
        assert!(setup.editor_mut().remove_strip(b.strip).is_none());
    }

    #[test]
    fn test_master_switch_never_returns_old_strip() {
        let (mut setup, a, _) = overlap_setup();
        setup.set_master_frame(30);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), Some(a));

        // New master at the same frame, different strips
        let mut other = Scene::new("EDIT2", 1, 500);
        other.set_frame_current(30);
        let other_uuid = setup.project.add_scene(other);
        let (_, c_strip) = setup.project.create_shot(other_uuid, "C", 100, 1, 1).expect("shot");

        setup.sync.set_master_scene(Some(other_uuid));
        let resolved = setup.sync.get_sync_master_strip(&setup.project, true).expect("active");
        assert_eq!(resolved.strip, c_strip);

        // Gap in the new master: cached A must not leak through
        setup.project.scene_mut(other_uuid).expect("scene").set_frame_current(300);
        setup.sync.set_master_scene(Some(other_uuid));
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), None);
    }

    #[test]
    fn test_no_master_is_none() {
        let (setup, _, _) = overlap_setup();
        setup.sync.set_master_scene(None);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, true), None);
        assert!(setup.sync.resolve_chain(&setup.project, true).is_empty());
    }

    #[test]
    fn test_sticky_tie_break_on_equal_channel() {
        let mut setup = Setup::new();
        let first = setup.add_shot("first", 1, 1, 100);
        let second = setup.add_shot("second", 1, 80, 100);

        // Overlap 80..=100 on one channel: first in order wins without history
        setup.set_master_frame(90);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(first));

        // Scrub into second alone, then back into the overlap: stays on second
        setup.set_master_frame(120);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(second));
        setup.set_master_frame(90);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(second));
    }

    #[test]
    fn test_muted_strip_and_channel_skipped() {
        let mut setup = Setup::new();
        let shots: Vec<ActiveShot> = (1..=4).map(|ch| setup.add_shot("S", ch, 1, 50)).collect();

        setup.set_master_frame(1);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(shots[3]));

        setup.editor_mut().set_channel_mute(4, true);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(shots[2]));

        setup.strip_mut(shots[2].strip).set_muted(true);
        assert_eq!(setup.sync.get_sync_master_strip(&setup.project, false), Some(shots[1]));
    }

    #[test]
    fn test_two_level_nesting_double_remap() {
        let mut setup = Setup::new();
        // Sequence scene placed at master 101, local range 1..=200
        let seq = setup.add_shot("SEQ", 1, 101, 200);
        // Inside SEQ: shot placed at SEQ local 21, local 1001..=1050
        let mut inner = Scene::new("SH020", 1001, 1050);
        inner.set_frame_current(1001);
        let inner_uuid = setup.project.add_scene(inner);
        let inner_strip = {
            let inner_scene = setup.project.scene(inner_uuid).expect("scene").clone();
            let seq_scene = setup.project.scene_mut(seq.scene).expect("seq");
            seq_scene.sequence_editor_create().new_scene_strip("SH020", &inner_scene, 1, 21)
        };

        // Master 130 -> SEQ local 30 -> SH020 local 1001 + (30 - 21) = 1010
        setup.set_master_frame(130);
        let chain = setup.sync.resolve_chain(&setup.project, false);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].shot, seq);
        assert_eq!(chain[0].local_frame, 30);
        assert_eq!(chain[1].parent, seq.scene);
        assert_eq!(chain[1].shot.strip, inner_strip);
        assert_eq!(chain[1].parent_frame, 30);
        assert_eq!(chain[1].local_frame, 1010);

        // Outside the inner strip: chain stops at level one
        setup.set_master_frame(110);
        assert_eq!(setup.sync.resolve_chain(&setup.project, false).len(), 1);
    }

    #[test]
    fn test_nesting_cycle_terminates() {
        let mut setup = Setup::new();
        let shot = setup.add_shot("LOOP", 1, 1, 100);
        // Shot places the master inside itself
        let master = setup.project.scene(setup.edit).expect("edit").clone();
        setup
            .project
            .scene_mut(shot.scene)
            .expect("shot")
            .sequence_editor_create()
            .new_scene_strip("back", &master, 1, 1);

        setup.set_master_frame(5);
        let chain = setup.sync.resolve_chain(&setup.project, false);
        assert!(chain.len() <= 2);
        assert_eq!(chain[0].shot, shot);
    }

    #[test]
    fn test_find_local_strip_prefers_given() {
        let mut setup = Setup::new();
        let a = setup.add_shot("A", 1, 1, 100);
        // Second placement of the same scene
        let dup = {
            let scene = setup.project.scene(a.scene).expect("scene").clone();
            setup.editor_mut().new_scene_strip("A2", &scene, 1, 200)
        };

        let found = find_local_strip(&setup.project, setup.edit, a.scene, 10, None).map(|s| s.uuid());
        assert_eq!(found, Some(a.strip));
        let found = find_local_strip(&setup.project, setup.edit, a.scene, 10, Some(dup)).map(|s| s.uuid());
        assert_eq!(found, Some(dup));
        assert!(find_local_strip(&setup.project, setup.edit, a.scene, 500, None).is_none());
    }
}
