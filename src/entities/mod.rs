//! Entities module - host scene graph as seen by the sync engine.
//!
//! - `Project` holds scenes, linkable objects and windows
//! - `Scene` is an independently-timed timeline, optionally with a `SequenceEditor`
//! - `Strip` places a child scene on a parent timeline

pub mod attrs;
pub mod keys;
pub mod project;
pub mod scene;
pub mod strip;

pub use attrs::{AttrValue, Attrs};
pub use project::{ObjectKind, Project, SceneObject, Window};
pub use scene::{Scene, SequenceEditor};
pub use strip::Strip;
