//! Project: the host session's scene graph as seen by the sync engine.
//!
//! Holds every scene, every object that scenes can link (cameras among them)
//! and the open windows. All cross references are UUIDs resolved against the
//! project on use, so a dangling id degrades to "not found" instead of keeping
//! a deleted entity alive.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scene::Scene;
use super::strip::Strip;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Camera,
    Other,
}

/// Object that scenes can link (shared across scenes, like host data-blocks).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneObject {
    pub uuid: Uuid,
    pub name: String,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn camera(name: &str) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            kind: ObjectKind::Camera,
        }
    }

    pub fn other(name: &str) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            kind: ObjectKind::Other,
        }
    }

    pub fn is_camera(&self) -> bool {
        self.kind == ObjectKind::Camera
    }
}

/// Host window showing one scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Window {
    pub scene: Uuid,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    /// Scenes keyed by UUID, in creation order
    pub scenes: IndexMap<Uuid, Scene>,
    #[serde(default)]
    pub objects: IndexMap<Uuid, SceneObject>,
    #[serde(default)]
    pub windows: Vec<Window>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add scene, returns its UUID
    pub fn add_scene(&mut self, scene: Scene) -> Uuid {
        let uuid = scene.uuid();
        self.scenes.insert(uuid, scene);
        uuid
    }

    pub fn scene(&self, uuid: Uuid) -> Option<&Scene> {
        self.scenes.get(&uuid)
    }

    pub fn scene_mut(&mut self, uuid: Uuid) -> Option<&mut Scene> {
        self.scenes.get_mut(&uuid)
    }

    pub fn scene_by_name(&self, name: &str) -> Option<&Scene> {
        self.scenes.values().find(|s| s.name() == name)
    }

    /// Add object and link it into `scene` (if given)
    pub fn add_object(&mut self, object: SceneObject, scene: Option<Uuid>) -> Uuid {
        let uuid = object.uuid;
        self.objects.insert(uuid, object);
        if let Some(scene) = scene.and_then(|id| self.scenes.get_mut(&id)) {
            scene.link_object(uuid);
        }
        uuid
    }

    pub fn object(&self, uuid: Uuid) -> Option<&SceneObject> {
        self.objects.get(&uuid)
    }

    pub fn object_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.values().find(|o| o.name == name)
    }

    pub fn add_window(&mut self, scene: Uuid) -> usize {
        self.windows.push(Window { scene });
        self.windows.len() - 1
    }

    pub fn window(&self, idx: usize) -> Option<&Window> {
        self.windows.get(idx)
    }

    /// Create a new scene of `len` frames (starting at 1) and place it on
    /// `parent`'s sequence editor. Returns (scene, strip) UUIDs, or None if
    /// `parent` does not exist.
    pub fn create_shot(&mut self, parent: Uuid, name: &str, len: i32, channel: i32, frame_start: i32) -> Option<(Uuid, Uuid)> {
        if !self.scenes.contains_key(&parent) {
            return None;
        }
        let shot = Scene::new(name, 1, len.max(1));
        let strip = Strip::new(name, shot.uuid(), shot.frame_start(), shot.frame_count(), channel, frame_start);
        let scene_uuid = self.add_scene(shot);
        let strip_uuid = strip.uuid();
        self.scenes.get_mut(&parent)?.sequence_editor_create().add_strip(strip);
        Some((scene_uuid, strip_uuid))
    }

    /// Find strip by UUID directly under `parent`
    pub fn strip(&self, parent: Uuid, strip: Uuid) -> Option<&Strip> {
        self.scene(parent)?.sequence_editor.as_ref()?.strip(strip)
    }

    pub fn strip_mut(&mut self, parent: Uuid, strip: Uuid) -> Option<&mut Strip> {
        self.scene_mut(parent)?.sequence_editor.as_mut()?.strip_mut(strip)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_shot() {
        let mut project = Project::new();
        let edit = project.add_scene(Scene::new("EDIT", 1, 500));
        let (shot, strip) = project.create_shot(edit, "SH010", 48, 1, 1).expect("shot");

        assert_eq!(project.scene(shot).map(|s| s.frame_count()), Some(48));
        let strip = project.strip(edit, strip).expect("strip");
        assert_eq!(strip.frame_final_end(), 49);
        assert_eq!(strip.scene(), Some(shot));

        assert!(project.create_shot(Uuid::new_v4(), "x", 10, 1, 1).is_none());
    }

    #[test]
    fn test_objects_link_into_scene() {
        let mut project = Project::new();
        let shot = project.add_scene(Scene::new("SHOT", 1, 10));
        let cam = project.add_object(SceneObject::camera("Cam1"), Some(shot));
        assert!(project.scene(shot).expect("scene").has_object(cam));
        assert!(project.object(cam).expect("obj").is_camera());
        assert_eq!(project.object_by_name("Cam1").map(|o| o.uuid), Some(cam));
    }

    #[test]
    fn test_json_roundtrip_keeps_order_and_clears_dirty() {
        let mut project = Project::new();
        let edit = project.add_scene(Scene::new("EDIT", 1, 500));
        project.create_shot(edit, "A", 10, 1, 1);
        project.create_shot(edit, "B", 10, 1, 11);
        assert!(project.scene(edit).and_then(|s| s.sequence_editor.as_ref()).expect("ed").is_dirty());

        let json = project.to_json().expect("serialize");
        let loaded = Project::from_json(&json).expect("parse");
        let names: Vec<&str> = loaded.scenes.values().map(|s| s.name()).collect();
        assert_eq!(names, vec!["EDIT", "A", "B"]);
        let ed = loaded.scene(edit).and_then(|s| s.sequence_editor.as_ref()).expect("ed");
        assert_eq!(ed.len(), 2);
        assert!(!ed.is_dirty());
    }
}
