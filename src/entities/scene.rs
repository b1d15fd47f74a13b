//! Scene and its sequence editor.
//!
//! A `Scene` is an independently-timed timeline: it has its own inclusive
//! frame range, a playhead and an active camera. A scene that owns a
//! `SequenceEditor` can place other scenes as strips, which is how the master
//! timeline and nested shot timelines are built.
//!
//! # Strip Order
//!
//! `SequenceEditor::strips` keeps insertion order. Resolution never depends on
//! it directly: `sorted()` yields strips by (channel, frame_final_start), the
//! order used for deterministic tie-breaking.
//!
//! # Dirty Flag
//!
//! `SequenceEditor::is_dirty()` is true when any strip attrs changed, a strip
//! was added or removed, or a channel was (un)muted. The resolver treats a
//! dirty master editor as "cached resolution is stale"; the sync updater
//! clears the flag.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attrs::{AttrValue, Attrs};
use super::keys::*;
use super::strip::Strip;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SequenceEditor {
    pub strips: Vec<Strip>,
    /// Channels whose strips are skipped
    #[serde(default)]
    muted_channels: BTreeSet<i32>,
    /// Highlighted strip
    #[serde(default)]
    active_strip: Option<Uuid>,
    #[serde(skip)]
    dirty: bool,
}

impl SequenceEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `scene` on `channel` at `frame_start`, covering its whole range.
    /// Returns the new strip UUID.
    pub fn new_scene_strip(&mut self, name: &str, scene: &Scene, channel: i32, frame_start: i32) -> Uuid {
        let strip = Strip::new(name, scene.uuid(), scene.frame_start(), scene.frame_count(), channel, frame_start);
        self.add_strip(strip)
    }

    pub fn add_strip(&mut self, strip: Strip) -> Uuid {
        let uuid = strip.uuid();
        self.strips.push(strip);
        self.dirty = true;
        uuid
    }

    pub fn remove_strip(&mut self, uuid: Uuid) -> Option<Strip> {
        let idx = self.strips.iter().position(|s| s.uuid() == uuid)?;
        let strip = self.strips.remove(idx);
        if self.active_strip == Some(uuid) {
            self.active_strip = None;
        }
        self.dirty = true;
        Some(strip)
    }

    pub fn strip(&self, uuid: Uuid) -> Option<&Strip> {
        self.strips.iter().find(|s| s.uuid() == uuid)
    }

    pub fn strip_mut(&mut self, uuid: Uuid) -> Option<&mut Strip> {
        self.strips.iter_mut().find(|s| s.uuid() == uuid)
    }

    /// Strips ordered by (channel, frame_final_start)
    pub fn sorted(&self) -> Vec<&Strip> {
        let mut strips: Vec<&Strip> = self.strips.iter().collect();
        strips.sort_by_key(|s| (s.channel(), s.frame_final_start()));
        strips
    }

    pub fn channel_muted(&self, channel: i32) -> bool {
        self.muted_channels.contains(&channel)
    }

    pub fn set_channel_mute(&mut self, channel: i32, mute: bool) {
        let changed = if mute {
            self.muted_channels.insert(channel)
        } else {
            self.muted_channels.remove(&channel)
        };
        if changed {
            self.dirty = true;
        }
    }

    /// True if the strip takes part in resolution
    pub fn is_playable(&self, strip: &Strip) -> bool {
        !strip.muted() && !self.channel_muted(strip.channel()) && strip.scene().is_some()
    }

    pub fn active_strip(&self) -> Option<Uuid> {
        self.active_strip
    }

    /// Highlight a strip. Not a structural edit.
    pub fn set_active_strip(&mut self, uuid: Option<Uuid>) {
        self.active_strip = uuid;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.strips.iter().any(|s| s.attrs.is_dirty())
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
        for strip in &mut self.strips {
            strip.attrs.clear_dirty();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    /// Persistent attributes: uuid, name, start, end, frame, camera, preview range
    pub attrs: Attrs,
    /// Objects linked into this scene
    #[serde(default)]
    pub objects: Vec<Uuid>,
    #[serde(default)]
    pub sequence_editor: Option<SequenceEditor>,
}

impl Scene {
    /// New scene with inclusive range `start..=end`, playhead at `start`.
    pub fn new(name: &str, start: i32, end: i32) -> Self {
        let mut attrs = Attrs::new();
        attrs.set_uuid(A_UUID, Uuid::new_v4());
        attrs.set(A_NAME, AttrValue::Str(name.to_string()));
        attrs.set(A_START, AttrValue::Int(start));
        attrs.set(A_END, AttrValue::Int(end.max(start)));
        attrs.set(A_FRAME, AttrValue::Int(start));
        attrs.set(A_USE_PREVIEW, AttrValue::Bool(false));
        attrs.clear_dirty();

        Self {
            attrs,
            objects: Vec::new(),
            sequence_editor: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.attrs.get_uuid(A_UUID).unwrap_or_else(Uuid::nil)
    }

    pub fn name(&self) -> &str {
        self.attrs.get_str(A_NAME).unwrap_or("Untitled")
    }

    pub fn frame_start(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_START)
    }

    pub fn frame_end(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_END)
    }

    /// Number of frames in `frame_start..=frame_end`
    pub fn frame_count(&self) -> i32 {
        (self.frame_end() - self.frame_start() + 1).max(1)
    }

    pub fn frame_current(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_FRAME)
    }

    /// Move the playhead. Returns true if it moved.
    pub fn set_frame_current(&mut self, frame: i32) -> bool {
        if self.frame_current() == frame {
            return false;
        }
        self.attrs.set(A_FRAME, AttrValue::Int(frame));
        true
    }

    pub fn camera(&self) -> Option<Uuid> {
        self.attrs.get_uuid(A_CAMERA)
    }

    /// Returns true if the camera changed.
    pub fn set_camera(&mut self, camera: Option<Uuid>) -> bool {
        if self.camera() == camera {
            return false;
        }
        self.attrs.set_opt_uuid(A_CAMERA, camera);
        true
    }

    pub fn has_object(&self, object: Uuid) -> bool {
        self.objects.contains(&object)
    }

    pub fn link_object(&mut self, object: Uuid) {
        if !self.has_object(object) {
            self.objects.push(object);
        }
    }

    /// Inclusive preview range if enabled
    pub fn preview_range(&self) -> Option<(i32, i32)> {
        if !self.attrs.get_bool_or(A_USE_PREVIEW, false) {
            return None;
        }
        let start = self.attrs.get_i32(A_PREVIEW_START)?;
        let end = self.attrs.get_i32(A_PREVIEW_END)?;
        Some((start, end))
    }

    /// Returns true if the preview range changed.
    pub fn set_preview_range(&mut self, range: Option<(i32, i32)>) -> bool {
        if self.preview_range() == range {
            return false;
        }
        match range {
            Some((start, end)) => {
                self.attrs.set(A_USE_PREVIEW, AttrValue::Bool(true));
                self.attrs.set(A_PREVIEW_START, AttrValue::Int(start));
                self.attrs.set(A_PREVIEW_END, AttrValue::Int(end.max(start)));
            }
            None => self.attrs.set(A_USE_PREVIEW, AttrValue::Bool(false)),
        }
        true
    }

    pub fn sequence_editor_create(&mut self) -> &mut SequenceEditor {
        self.sequence_editor.get_or_insert_with(SequenceEditor::new)
    }

    /// Strips directly under this scene (empty if no editor)
    pub fn strips(&self) -> &[Strip] {
        self.sequence_editor
            .as_ref()
            .map(|ed| ed.strips.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scene_strip_covers_scene_range() {
        let shot = Scene::new("SHOT", 1, 250);
        let mut edit = Scene::new("EDIT", 1, 1000);
        let ed = edit.sequence_editor_create();
        let id = ed.new_scene_strip("SHOT", &shot, 1, 1);

        let strip = ed.strip(id).expect("strip");
        assert_eq!(strip.frame_final_start(), 1);
        assert_eq!(strip.frame_final_end(), 251);
        assert_eq!(strip.src_start(), 1);
        assert_eq!(strip.scene(), Some(shot.uuid()));
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_sorted_by_channel_then_start() {
        let shot = Scene::new("SHOT", 1, 10);
        let mut ed = SequenceEditor::new();
        let c2 = ed.new_scene_strip("c2", &shot, 2, 0);
        let c1_late = ed.new_scene_strip("c1b", &shot, 1, 50);
        let c1_early = ed.new_scene_strip("c1a", &shot, 1, 0);

        let order: Vec<Uuid> = ed.sorted().iter().map(|s| s.uuid()).collect();
        assert_eq!(order, vec![c1_early, c1_late, c2]);
    }

    #[test]
    fn test_dirty_tracking() {
        let shot = Scene::new("SHOT", 1, 10);
        let mut ed = SequenceEditor::new();
        let id = ed.new_scene_strip("s", &shot, 1, 0);
        ed.clear_dirty();
        assert!(!ed.is_dirty());

        // Highlight is not structural
        ed.set_active_strip(Some(id));
        assert!(!ed.is_dirty());

        ed.strip_mut(id).expect("strip").move_by(3);
        assert!(ed.is_dirty());
        ed.clear_dirty();

        ed.set_channel_mute(1, true);
        assert!(ed.is_dirty());
        ed.clear_dirty();
        ed.set_channel_mute(1, true);
        assert!(!ed.is_dirty());
    }

    #[test]
    fn test_playable() {
        let shot = Scene::new("SHOT", 1, 10);
        let mut ed = SequenceEditor::new();
        let id = ed.new_scene_strip("s", &shot, 3, 0);
        assert!(ed.is_playable(ed.strip(id).expect("strip")));

        ed.set_channel_mute(3, true);
        assert!(!ed.is_playable(ed.strip(id).expect("strip")));
        ed.set_channel_mute(3, false);

        ed.strip_mut(id).expect("strip").set_muted(true);
        assert!(!ed.is_playable(ed.strip(id).expect("strip")));
    }

    #[test]
    fn test_preview_range() {
        let mut scene = Scene::new("SHOT", 1, 100);
        assert_eq!(scene.preview_range(), None);
        assert!(scene.set_preview_range(Some((10, 20))));
        assert!(!scene.set_preview_range(Some((10, 20))));
        assert_eq!(scene.preview_range(), Some((10, 20)));
        assert!(scene.set_preview_range(None));
        assert_eq!(scene.preview_range(), None);
    }
}
