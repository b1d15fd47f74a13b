//! Core sync engine - remapping, resolution, cache, propagation, events
//!
//! Independent of any host UI: everything operates on an `entities::Project`.

pub mod cache;
pub mod error;
pub mod event_bus;
pub mod remap;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod sync_events;
pub mod system;
pub mod updater;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenience
pub use cache::{ActiveShot, CacheStats, InvalidateReason, ResolutionCache};
pub use error::SyncError;
pub use event_bus::{EventBus, SyncEventEmitter, downcast_event};
pub use remap::{local_frame, local_range, remap_frame_value};
pub use resolver::{MAX_NESTING_DEPTH, ResolvedLevel, find_local_strip, find_strip_at, resolve_nested};
pub use session::Session;
pub use settings::{SharedSyncSettings, SyncSettings, get_sync_settings};
pub use system::{SyncContext, SyncSystem};
