//! Attribute key constants for Attrs access.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `strip.attrs.get_i32(A_CHANNEL)`

// === Identity ===
/// Entity UUID
pub const A_UUID: &str = "uuid";
/// Human-readable name
pub const A_NAME: &str = "name";

// === Strip placement (parent timeline) ===
/// Untrimmed content start in parent frames
pub const A_FRAME_START: &str = "frame_start";
/// Parent frames cut from the head
pub const A_TRIM_IN: &str = "trim_in";
/// Parent frames cut from the tail
pub const A_TRIM_OUT: &str = "trim_out";
/// Overlap priority (higher wins)
pub const A_CHANNEL: &str = "channel";
/// Local frames per parent frame
pub const A_SPEED: &str = "speed";
/// Mute flag - strip is skipped by resolution
pub const A_MUTE: &str = "mute";

// === Strip source (child timeline) ===
/// Child scene UUID
pub const A_SCENE: &str = "scene";
/// Camera object used while the strip plays
pub const A_SCENE_CAMERA: &str = "scene_camera";
/// Child scene start frame, snapshotted at placement
pub const A_SRC_START: &str = "src_start";
/// Child range length in local frames
pub const A_SRC_LEN: &str = "src_len";

// === Scene timing ===
/// First frame of the scene range (inclusive)
pub const A_START: &str = "start";
/// Last frame of the scene range (inclusive)
pub const A_END: &str = "end";
/// Current playhead frame
pub const A_FRAME: &str = "frame";
/// Active camera object UUID
pub const A_CAMERA: &str = "camera";

// === Preview range ===
pub const A_USE_PREVIEW: &str = "use_preview_range";
pub const A_PREVIEW_START: &str = "preview_start";
pub const A_PREVIEW_END: &str = "preview_end";
