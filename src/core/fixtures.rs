//! Test builders shared by resolver, updater and operator tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use super::cache::ActiveShot;
use super::event_bus::{Event, EventBus};
use super::system::{SyncContext, SyncSystem};
use crate::entities::{Project, Scene, SequenceEditor, Strip};

/// Edit scene "EDIT" (1..=250) with a sequence editor, one window showing it,
/// sync enabled with EDIT as master. Settings are private to the setup.
pub struct Setup {
    pub project: Project,
    pub sync: SyncSystem,
    pub bus: EventBus,
    pub edit: Uuid,
    pub ctx: SyncContext,
}

impl Setup {
    pub fn new() -> Self {
        let mut project = Project::new();
        let mut edit = Scene::new("EDIT", 1, 250);
        edit.sequence_editor_create();
        let edit = project.add_scene(edit);
        let window = project.add_window(edit);

        let bus = EventBus::new();
        let sync = SyncSystem::new(Arc::default(), bus.emitter());
        sync.set_master_scene(Some(edit));
        sync.set_enabled(true);
        bus.poll();

        Self {
            project,
            sync,
            bus,
            edit,
            ctx: SyncContext::window(window),
        }
    }

    /// Basic setup plus one 250-frame shot at frame 1 on channel 1.
    pub fn basic() -> (Self, ActiveShot) {
        let mut setup = Self::new();
        let shot = setup.add_shot("SH010", 1, 1, 250);
        (setup, shot)
    }

    /// New shot scene of `len` frames placed on the master.
    pub fn add_shot(&mut self, name: &str, channel: i32, frame_start: i32, len: i32) -> ActiveShot {
        let (scene, strip) = self
            .project
            .create_shot(self.edit, name, len, channel, frame_start)
            .expect("master exists");
        ActiveShot { strip, scene }
    }

    pub fn strip(&self, uuid: Uuid) -> &Strip {
        self.project.strip(self.edit, uuid).expect("strip")
    }

    pub fn strip_mut(&mut self, uuid: Uuid) -> &mut Strip {
        self.project.strip_mut(self.edit, uuid).expect("strip")
    }

    pub fn editor_mut(&mut self) -> &mut SequenceEditor {
        self.project
            .scene_mut(self.edit)
            .and_then(|s| s.sequence_editor.as_mut())
            .expect("editor")
    }

    pub fn scene(&self, uuid: Uuid) -> &Scene {
        self.project.scene(uuid).expect("scene")
    }

    pub fn master_frame(&self) -> i32 {
        self.scene(self.edit).frame_current()
    }

    pub fn window_scene(&self) -> Uuid {
        let idx = self.ctx.window.expect("window");
        self.project.window(idx).expect("window").scene
    }

    /// Move the master playhead without running the updater.
    pub fn set_master_frame(&mut self, frame: i32) {
        self.project.scene_mut(self.edit).expect("edit").set_frame_current(frame);
    }

    /// Host frame change on the master: move the playhead, run the updater.
    pub fn frame_set(&mut self, frame: i32) {
        self.set_master_frame(frame);
        self.sync.sync_system_update(&mut self.project, &self.ctx, false);
    }

    /// Host frame change on a shot scene: move it, run bidirectional sync.
    pub fn shot_frame_set(&mut self, scene: Uuid, frame: i32) -> bool {
        self.project.scene_mut(scene).expect("scene").set_frame_current(frame);
        self.sync.sync_from_shot(&mut self.project, &self.ctx, scene)
    }

    /// Counter incremented on every `E` emitted from now on.
    pub fn count<E: Event>(&self) -> Arc<AtomicUsize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        self.bus.subscribe::<E, _>(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        counter
    }
}

pub fn hits(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
