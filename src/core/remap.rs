//! Frame remapping between a strip's local time base and its parent's.
//!
//! `speed` is local frames per parent frame, so
//! - local -> parent: `frame_start + round((local - src_start) / speed)`
//! - parent -> local: `src_start + round((parent - frame_start) * speed)`
//!
//! `frame_start` is the untrimmed placement; for an untrimmed strip it equals
//! `frame_final_start`. Rounding is half away from zero (`f64::round`).
//! At speed 1.0 both directions are exact inverses.

use crate::entities::Strip;

/// Local (child scene) frame -> parent (master) frame.
pub fn remap_frame_value(frame: i32, strip: &Strip) -> i32 {
    let offset = (frame - strip.src_start()) as f64 / strip.speed() as f64;
    strip.frame_start() + offset.round() as i32
}

/// Parent (master) frame -> local (child scene) frame.
pub fn local_frame(frame: i32, strip: &Strip) -> i32 {
    let offset = (frame - strip.frame_start()) as f64 * strip.speed() as f64;
    strip.src_start() + offset.round() as i32
}

/// Inclusive local frames visible through the strip.
pub fn local_range(strip: &Strip) -> (i32, i32) {
    let first = local_frame(strip.frame_final_start(), strip);
    let last = local_frame(strip.frame_final_end() - 1, strip);
    (first, last.max(first))
}
