//! Shared shell for the binary: logger setup, demo data and a driver that
//! plays the host's role (moving playheads, draining events).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use uuid::Uuid;

use crate::core::{ActiveShot, EventBus, Session, SharedSyncSettings, SyncContext, SyncError, SyncSystem};
use crate::entities::{Project, Scene, SceneObject};

/// Initialize `env_logger`.
///
/// Verbosity: 0 = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ = trace.
/// With `log_file` output goes to that file at exactly that level; otherwise
/// to stderr with `RUST_LOG` taking precedence.
pub fn init_logger(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        let default_level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Small edit with three shots, one overlay and a nested sequence.
///
/// ```text
/// ch3            [SQ010 320..=399: SH040 | SH050]
/// ch2            [SH030 150..=209]
/// ch1 [SH010 1..=100][SH020 101..=240]
/// ```
///
/// Returns the project and the master (EDIT) scene.
pub fn demo_project() -> (Project, Uuid) {
    let mut project = Project::new();
    let mut edit = Scene::new("EDIT", 1, 400);
    edit.sequence_editor_create();
    let edit = project.add_scene(edit);
    project.add_window(edit);

    let shots = [("SH010", 1, 1, 100), ("SH020", 1, 101, 140), ("SH030", 2, 150, 60)];
    for (name, channel, start, len) in shots {
        let Some((scene, strip)) = project.create_shot(edit, name, len, channel, start) else {
            continue;
        };
        let camera = project.add_object(SceneObject::camera(&format!("CAM_{}", name)), Some(scene));
        project.add_object(SceneObject::other(&format!("SET_{}", name)), Some(scene));
        if let Some(s) = project.scene_mut(scene) {
            s.set_camera(Some(camera));
        }
        if let Some(s) = project.strip_mut(edit, strip) {
            s.set_scene_camera(Some(camera));
        }
    }

    // Shared prop across SH010 and SH030
    if let Some(prop) = project.object_by_name("SET_SH010").map(|o| o.uuid) {
        let sh030 = project.scene_by_name("SH030").map(|s| s.uuid());
        if let Some(scene) = sh030.and_then(|uuid| project.scene_mut(uuid)) {
            scene.link_object(prop);
        }
    }

    if let Some((sequence, _)) = project.create_shot(edit, "SQ010", 80, 3, 320) {
        project.create_shot(sequence, "SH040", 40, 1, 1);
        project.create_shot(sequence, "SH050", 40, 1, 41);
    }

    (project, edit)
}

/// Host stand-in: owns the project, the sync system and the event bus.
pub struct Shell {
    pub project: Project,
    pub sync: SyncSystem,
    pub event_bus: EventBus,
    pub ctx: SyncContext,
}

impl Shell {
    /// Shell over `project`; the context window is the first one, if any.
    pub fn new(project: Project, settings: SharedSyncSettings) -> Self {
        let event_bus = EventBus::new();
        let sync = SyncSystem::new(settings, event_bus.emitter());
        let ctx = SyncContext {
            window: (!project.windows.is_empty()).then_some(0),
        };
        Self {
            project,
            sync,
            event_bus,
            ctx,
        }
    }

    /// Demo project with EDIT as master and sync enabled.
    pub fn demo(settings: SharedSyncSettings) -> Self {
        let (project, edit) = demo_project();
        let shell = Self::new(project, settings);
        shell.sync.set_master_scene(Some(edit));
        shell.sync.set_enabled(true);
        shell
    }

    /// Shell over a saved session; its sync settings replace the handle's.
    pub fn load_session<P: AsRef<Path>>(path: P, settings: SharedSyncSettings) -> Result<Self, SyncError> {
        let session = Session::load(path)?;
        let mut shell = Self::new(Project::new(), settings);
        shell.project = session.apply(&shell.sync);
        shell.ctx.window = (!shell.project.windows.is_empty()).then_some(0);
        Ok(shell)
    }

    pub fn save_session<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, SyncError> {
        Session::save(path, &self.project, &self.sync)
    }

    /// Move the master playhead and propagate. Returns the active shot.
    pub fn frame_set(&mut self, frame: i32, force: bool) -> Result<Option<ActiveShot>, SyncError> {
        let master = self.sync.settings().master_scene().ok_or(SyncError::NoMasterScene)?;
        let scene = self
            .project
            .scene_mut(master)
            .ok_or_else(|| SyncError::SceneNotFound(master.to_string()))?;
        scene.set_frame_current(frame);
        self.sync.sync_system_update(&mut self.project, &self.ctx, force);
        Ok(self.sync.settings().state().active)
    }

    /// Drain queued events, logging each. Returns how many were drained.
    pub fn process_events(&mut self) -> usize {
        let events = self.event_bus.poll();
        for event in &events {
            debug!("event: {}", (**event).type_name());
        }
        events.len()
    }
}
