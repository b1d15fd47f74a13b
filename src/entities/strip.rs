//! Strip: placement of a child scene on a parent timeline.
//!
//! # Coordinate Systems
//!
//! - `frame_start` - where local `src_start` plays in PARENT time (untrimmed)
//! - `src_start` / `src_len` - child scene range in LOCAL frames
//! - `trim_in` / `trim_out` - PARENT frames cut from head / tail
//! - `speed` - local frames per parent frame (2.0 = shot plays 2x faster)
//!
//! Computed values (parent time, half-open like the host):
//! - `frame_final_start()` = `frame_start + trim_in`
//! - `frame_final_end()` = `frame_start + round(src_len / speed) - trim_out`
//!
//! A strip contains `f` when `frame_final_start <= f < frame_final_end`.
//!
//! Like layers in a comp, all state sits in `Attrs`, so every edit that
//! changes a value flips the dirty flag the sync updater watches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attrs::{AttrValue, Attrs};
use super::keys::*;

/// Lower bound for speed, keeps remapping finite.
pub const MIN_SPEED: f32 = 0.01;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Strip {
    pub attrs: Attrs,
}

impl Strip {
    /// Place `src_len` local frames starting at local `src_start` of `scene`,
    /// beginning at parent frame `frame_start` on `channel`.
    pub fn new(
        name: &str,
        scene: Uuid,
        src_start: i32,
        src_len: i32,
        channel: i32,
        frame_start: i32,
    ) -> Self {
        let mut attrs = Attrs::new();
        attrs.set_uuid(A_UUID, Uuid::new_v4());
        attrs.set(A_NAME, AttrValue::Str(name.to_string()));
        attrs.set_uuid(A_SCENE, scene);
        attrs.set(A_SRC_START, AttrValue::Int(src_start));
        attrs.set(A_SRC_LEN, AttrValue::Int(src_len.max(1)));
        attrs.set(A_CHANNEL, AttrValue::Int(channel));
        attrs.set(A_FRAME_START, AttrValue::Int(frame_start));
        attrs.set(A_TRIM_IN, AttrValue::Int(0));
        attrs.set(A_TRIM_OUT, AttrValue::Int(0));
        attrs.set(A_SPEED, AttrValue::Float(1.0));
        attrs.set(A_MUTE, AttrValue::Bool(false));

        // Initial values are not edits
        attrs.clear_dirty();

        Self { attrs }
    }

    /// Builder-style speed override
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.set_speed(speed);
        self.attrs.clear_dirty();
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.attrs.get_uuid(A_UUID).unwrap_or_else(Uuid::nil)
    }

    pub fn name(&self) -> &str {
        self.attrs.get_str(A_NAME).unwrap_or("Untitled")
    }

    pub fn channel(&self) -> i32 {
        self.attrs.get_i32_or(A_CHANNEL, 1)
    }

    pub fn set_channel(&mut self, channel: i32) {
        self.attrs.set(A_CHANNEL, AttrValue::Int(channel));
    }

    /// Child scene played by this strip
    pub fn scene(&self) -> Option<Uuid> {
        self.attrs.get_uuid(A_SCENE)
    }

    /// Reassign the child scene. Keeps the parent placement; local start
    /// follows the new scene's range.
    pub fn set_scene(&mut self, scene: Uuid, src_start: i32) {
        self.attrs.set_uuid(A_SCENE, scene);
        self.attrs.set(A_SRC_START, AttrValue::Int(src_start));
    }

    pub fn scene_camera(&self) -> Option<Uuid> {
        self.attrs.get_uuid(A_SCENE_CAMERA)
    }

    pub fn set_scene_camera(&mut self, camera: Option<Uuid>) {
        self.attrs.set_opt_uuid(A_SCENE_CAMERA, camera);
    }

    pub fn muted(&self) -> bool {
        self.attrs.get_bool_or(A_MUTE, false)
    }

    pub fn set_muted(&mut self, mute: bool) {
        self.attrs.set(A_MUTE, AttrValue::Bool(mute));
    }

    pub fn speed(&self) -> f32 {
        self.attrs.get_float_or(A_SPEED, 1.0).abs().max(MIN_SPEED)
    }

    /// Change speed, keeping `frame_start` fixed (the tail moves).
    pub fn set_speed(&mut self, speed: f32) {
        self.attrs.set(A_SPEED, AttrValue::Float(speed.abs().max(MIN_SPEED)));
    }

    pub fn src_start(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_SRC_START)
    }

    pub fn src_len(&self) -> i32 {
        self.attrs.get_i32_or(A_SRC_LEN, 1)
    }

    pub fn frame_start(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_FRAME_START)
    }

    pub fn trim_in(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_TRIM_IN)
    }

    pub fn trim_out(&self) -> i32 {
        self.attrs.get_i32_or_zero(A_TRIM_OUT)
    }

    /// Untrimmed end in parent time (exclusive)
    pub fn content_end(&self) -> i32 {
        let len = (self.src_len() as f64 / self.speed() as f64).round() as i32;
        self.frame_start() + len.max(1)
    }

    /// First parent frame the strip plays
    pub fn frame_final_start(&self) -> i32 {
        self.frame_start() + self.trim_in()
    }

    /// One past the last parent frame the strip plays
    pub fn frame_final_end(&self) -> i32 {
        (self.content_end() - self.trim_out()).max(self.frame_final_start())
    }

    pub fn frame_final_duration(&self) -> i32 {
        self.frame_final_end() - self.frame_final_start()
    }

    /// Half-open containment, host convention
    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.frame_final_start() && frame < self.frame_final_end()
    }

    // --- Edits ---

    /// Slide the whole strip so its visible start lands on `frame`.
    pub fn move_to(&mut self, frame: i32) {
        let delta = frame - self.frame_final_start();
        self.move_by(delta);
    }

    pub fn move_by(&mut self, delta: i32) {
        let start = self.frame_start();
        self.attrs.set(A_FRAME_START, AttrValue::Int(start + delta));
    }

    /// Trim the head so the strip starts playing at `frame`.
    pub fn set_frame_final_start(&mut self, frame: i32) {
        let max_trim = (self.frame_final_end() - 1 - self.frame_start()).max(0);
        let trim_in = (frame - self.frame_start()).clamp(0, max_trim);
        self.attrs.set(A_TRIM_IN, AttrValue::Int(trim_in));
    }

    /// Trim (or extend) the tail so the strip stops before `frame`.
    /// Extending past the content end grows `src_len`.
    pub fn set_frame_final_end(&mut self, frame: i32) {
        let frame = frame.max(self.frame_final_start() + 1);
        let content_end = self.content_end();
        if frame > content_end {
            let src_len = ((frame - self.frame_start()) as f64 * self.speed() as f64).round() as i32;
            self.attrs.set(A_SRC_LEN, AttrValue::Int(src_len.max(1)));
            // Rounding may land one frame off; trim the remainder
            let overshoot = (self.content_end() - frame).max(0);
            self.attrs.set(A_TRIM_OUT, AttrValue::Int(overshoot));
        } else {
            self.attrs.set(A_TRIM_OUT, AttrValue::Int(content_end - frame));
        }
    }

    pub fn set_frame_final_duration(&mut self, duration: i32) {
        let start = self.frame_final_start();
        self.set_frame_final_end(start + duration.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_strip(frame_start: i32, src_len: i32) -> Strip {
        Strip::new("Shot", Uuid::new_v4(), 1, src_len, 1, frame_start)
    }

    #[test]
    fn test_strip_timing() {
        let strip = make_strip(10, 100);
        assert_eq!(strip.frame_final_start(), 10);
        assert_eq!(strip.frame_final_end(), 110); // exclusive
        assert_eq!(strip.frame_final_duration(), 100);
        assert!(strip.contains(10));
        assert!(strip.contains(109));
        assert!(!strip.contains(110));
        assert!(!strip.attrs.is_dirty());
    }

    #[test]
    fn test_speed_scales_parent_length() {
        let strip = make_strip(0, 100).with_speed(2.0);
        assert_eq!(strip.frame_final_end(), 50);

        let strip = make_strip(0, 100).with_speed(0.5);
        assert_eq!(strip.frame_final_end(), 200);
    }

    #[test]
    fn test_trims() {
        let mut strip = make_strip(0, 100);
        strip.set_frame_final_start(10);
        assert_eq!(strip.trim_in(), 10);
        assert_eq!(strip.frame_final_start(), 10);
        assert_eq!(strip.frame_start(), 0);

        strip.set_frame_final_duration(10);
        assert_eq!(strip.frame_final_end(), 20);
        assert_eq!(strip.trim_out(), 80);
        assert!(strip.attrs.is_dirty());
    }

    #[test]
    fn test_extend_past_content_grows_source() {
        let mut strip = make_strip(0, 10);
        strip.set_frame_final_end(25);
        assert_eq!(strip.frame_final_end(), 25);
        assert_eq!(strip.src_len(), 25);
        assert_eq!(strip.trim_out(), 0);
    }

    #[test]
    fn test_move_keeps_trim() {
        let mut strip = make_strip(0, 100);
        strip.set_frame_final_start(5);
        strip.move_to(50);
        assert_eq!(strip.frame_final_start(), 50);
        assert_eq!(strip.frame_start(), 45);
        assert_eq!(strip.frame_final_end(), 145);
    }

    #[test]
    fn test_trim_never_inverts_interval() {
        let mut strip = make_strip(0, 10);
        strip.set_frame_final_start(50);
        assert!(strip.frame_final_start() < strip.frame_final_end());
        strip.set_frame_final_end(-5);
        assert!(strip.frame_final_start() <= strip.frame_final_end());
    }
}
