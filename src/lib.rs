//! seqsync - timeline synchronization engine
//!
//! Resolves which shot strip is active on a master timeline, remaps frames
//! between the master and shot time bases, and propagates playhead changes
//! (both ways) with change notifications.

// Core engine (remap, resolver, cache, updater, events)
pub mod core;

// Host model and front-end modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod ops;
pub mod shell;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, SyncEventEmitter, downcast_event};
pub use core::{
    ActiveShot, InvalidateReason, ResolvedLevel, Session, SyncContext, SyncError, SyncSettings, SyncSystem,
    get_sync_settings, local_frame, remap_frame_value,
};

// Re-export entities
pub use entities::{AttrValue, Attrs, Project, Scene, Strip};
