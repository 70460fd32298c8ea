//! Signal samplers: one raw input → one float in `[0, 1]`.
//!
//! All four are pure functions.  The only memory any of them needs (the
//! velocity sampler's previous point) lives in the stage's
//! [`GestureContext`](crate::context::GestureContext), so it is dropped
//! together with the stage.

use std::time::Duration;

use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// Screen geometry
// ════════════════════════════════════════════════════════════════════════════

/// A screen-space point in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self { Rect { x, y, w, h } }

    pub fn center(&self) -> Point { Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0) }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SamplerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tunables for the four samplers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Hold time that maps to 1.0.
    pub hold_ramp_ms:           u64,
    /// Pointer speed (px/ms) that maps to 1.0.
    pub velocity_scale:         f32,
    /// Distance from the anchor center (px) at which proximity reaches 0.
    pub proximity_max_distance: f32,
    /// Easing exponent applied to the linear proximity ratio.
    pub proximity_exponent:     f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            hold_ramp_ms:           4000,
            velocity_scale:         2.0,
            proximity_max_distance: 320.0,
            proximity_exponent:     1.5,
        }
    }
}

impl SamplerConfig {
    pub fn hold_ramp(&self) -> Duration { Duration::from_millis(self.hold_ramp_ms) }
}

// ════════════════════════════════════════════════════════════════════════════
// Samplers
// ════════════════════════════════════════════════════════════════════════════

/// `clamp(elapsed / ramp, 0, 1)`.  A zero ramp saturates immediately.
pub fn hold_value(elapsed: Duration, ramp: Duration) -> f32 {
    if ramp.is_zero() { return 1.0; }
    (elapsed.as_secs_f32() / ramp.as_secs_f32()).clamp(0.0, 1.0)
}

/// `clamp(1 − (y − top) / height, 0, 1)`: the top edge reads 1.0.
pub fn vertical_value(pointer_y: f32, container: &Rect) -> f32 {
    if container.h <= 0.0 { return 0.0; }
    (1.0 - (pointer_y - container.y) / container.h).clamp(0.0, 1.0)
}

/// `clamp(distance / elapsed_ms / scale, 0, 1)`, with `elapsed_ms` floored at 1.
pub fn velocity_value(prev: Point, curr: Point, elapsed_ms: f32, scale: f32) -> f32 {
    let elapsed = elapsed_ms.max(1.0);
    let speed = prev.distance(curr) / elapsed;
    if scale <= 0.0 { return if speed > 0.0 { 1.0 } else { 0.0 }; }
    (speed / scale).clamp(0.0, 1.0)
}

/// `(1 − clamp(distance / max, 0, 1)) ^ exponent`.
pub fn proximity_value(pointer: Point, anchor_center: Point, max_distance: f32, exponent: f32) -> f32 {
    if max_distance <= 0.0 {
        return if pointer == anchor_center { 1.0 } else { 0.0 };
    }
    let ratio = (pointer.distance(anchor_center) / max_distance).clamp(0.0, 1.0);
    (1.0 - ratio).powf(exponent)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const BED: Rect = Rect::new(100.0, 200.0, 400.0, 300.0);

    #[test]
    fn hold_half_way() {
        let v = hold_value(Duration::from_millis(2000), Duration::from_millis(4000));
        assert_eq!(v, 0.5);
    }

    #[test]
    fn hold_clamps_at_exactly_one() {
        let ramp = Duration::from_millis(4000);
        assert_eq!(hold_value(Duration::from_millis(4000), ramp), 1.0);
        assert_eq!(hold_value(Duration::from_secs(60), ramp), 1.0);
    }

    #[test]
    fn vertical_top_and_bottom() {
        assert_eq!(vertical_value(200.0, &BED), 1.0);
        assert_eq!(vertical_value(500.0, &BED), 0.0);
        assert_eq!(vertical_value(350.0, &BED), 0.5);
        // outside the container clamps
        assert_eq!(vertical_value(50.0, &BED), 1.0);
        assert_eq!(vertical_value(900.0, &BED), 0.0);
    }

    #[test]
    fn velocity_zero_elapsed_matches_one() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.5, 0.0);
        assert_eq!(velocity_value(a, b, 0.0, 2.0), velocity_value(a, b, 1.0, 2.0));
        assert_eq!(velocity_value(a, b, 1.0, 2.0), 0.75);
    }

    #[test]
    fn velocity_saturates() {
        let v = velocity_value(Point::new(0.0, 0.0), Point::new(500.0, 0.0), 10.0, 2.0);
        assert_eq!(v, 1.0);
    }

    #[test]
    fn proximity_endpoints() {
        let c = Point::new(300.0, 300.0);
        assert_eq!(proximity_value(c, c, 320.0, 1.5), 1.0);
        assert_eq!(proximity_value(Point::new(620.0, 300.0), c, 320.0, 1.5), 0.0);
        assert_eq!(proximity_value(Point::new(900.0, 900.0), c, 320.0, 1.5), 0.0);
    }

    #[test]
    fn proximity_eases() {
        let c = Point::new(0.0, 0.0);
        let v = proximity_value(Point::new(160.0, 0.0), c, 320.0, 1.5);
        assert!((v - 0.5f32.powf(1.5)).abs() < 1e-6);
    }

    #[test]
    fn rect_center_and_contains() {
        assert_eq!(BED.center(), Point::new(300.0, 350.0));
        assert!(BED.contains(Point::new(100.0, 200.0)));
        assert!(!BED.contains(Point::new(500.0, 200.0)));
    }
}
