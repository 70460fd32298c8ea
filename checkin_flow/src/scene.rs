//! Animation state behind the panels.
//!
//! Everything here is cosmetic: wind streaks drifting across the window, the
//! sparks circling the figure's head, the figure's idle bob, a scatter of
//! crowd dots and the fade-in of each stage prompt.  None of it feeds back
//! into the check-in except the bob, which moves the figure the proximity
//! sampler measures against.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use checkin_core::presentation::MAX_CROWD_DOTS;
use checkin_core::Point;

pub const WIND_STREAKS: usize = 40;

// ════════════════════════════════════════════════════════════════════════════
// WindField
// ════════════════════════════════════════════════════════════════════════════

/// One horizontal streak of moving air.
#[derive(Clone, Debug, PartialEq)]
pub struct Streak {
    pub x:       f32,
    pub y:       f32,
    pub length:  f32,
    /// Pixels per frame at speed factor 1.
    pub speed:   f32,
    pub opacity: f32,
    /// Degrees.
    pub hue:     f32,
}

#[derive(Debug)]
pub struct WindField {
    pub streaks: Vec<Streak>,
    width:       f32,
}

impl WindField {
    pub fn new(rng: &mut impl Rng, count: usize, width: f32, height: f32) -> Self {
        let streaks = (0..count).map(|_| Streak {
            x:       rng.gen_range(0.0..width),
            y:       rng.gen_range(0.0..height),
            length:  rng.gen_range(40.0..100.0),
            speed:   rng.gen_range(0.5..1.5),
            opacity: rng.gen_range(0.2..0.6),
            hue:     rng.gen_range(190.0..210.0),
        }).collect();
        WindField { streaks, width }
    }

    /// Drift every streak right; ones that leave re-enter on the left.
    pub fn tick(&mut self, speed_factor: f32) {
        for s in &mut self.streaks {
            s.x += s.speed * speed_factor;
            if s.x > self.width {
                s.x = -s.length;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Orbit — sparks around the head
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Orbit {
    pub angle: f32,
}

impl Orbit {
    pub fn tick(&mut self) {
        self.angle = (self.angle + 0.04) % std::f32::consts::TAU;
    }

    /// Position of spark `i` of `count`, spread evenly around `center`.
    pub fn spark(&self, i: usize, count: usize, center: Point, radius: f32) -> Point {
        let step = std::f32::consts::TAU / count.max(1) as f32;
        let a = self.angle + step * i as f32;
        // alternate sparks sit on a slightly wider ring
        let r = if i % 2 == 0 { radius } else { radius * 1.25 };
        Point::new(center.x + r * a.cos(), center.y + r * a.sin())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Bob — the figure's idle float
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bob {
    phase: f32,
}

impl Bob {
    pub const AMPLITUDE_PX: f32 = 6.0;

    pub fn tick(&mut self) {
        self.phase = (self.phase + 0.05) % std::f32::consts::TAU;
    }

    /// Vertical offset in pixels.
    pub fn offset(&self) -> f32 { Self::AMPLITUDE_PX * self.phase.sin() }
}

// ════════════════════════════════════════════════════════════════════════════
// PromptFade
// ════════════════════════════════════════════════════════════════════════════

/// Fade-in of the active stage's prompt.  Restarts on every stage change.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptFade {
    pub progress: f32,
}

impl Default for PromptFade {
    fn default() -> Self { PromptFade { progress: 0.0 } }
}

impl PromptFade {
    pub fn restart(&mut self) { self.progress = 0.0; }

    /// Advance one frame.  Returns true when the fade completes.
    pub fn tick(&mut self) -> bool {
        if self.progress >= 1.0 { return false; }
        self.progress = (self.progress + 0.04).min(1.0);
        self.progress >= 1.0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Scene {
    pub wind:   WindField,
    pub orbit:  Orbit,
    pub bob:    Bob,
    pub prompt: PromptFade,
    /// Crowd positions, normalized to the map rectangle.
    pub crowd:  Vec<(f32, f32)>,
}

impl Scene {
    pub fn new(seed: Option<u64>, width: f32, height: f32) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        };
        let wind = WindField::new(&mut rng, WIND_STREAKS, width, height);
        let crowd = (0..MAX_CROWD_DOTS).map(|_| (rng.gen::<f32>(), rng.gen::<f32>())).collect();
        Scene {
            wind,
            orbit:  Orbit::default(),
            bob:    Bob::default(),
            prompt: PromptFade::default(),
            crowd,
        }
    }

    pub fn tick(&mut self, wind_speed_factor: f32) {
        self.wind.tick(wind_speed_factor);
        self.orbit.tick();
        self.bob.tick();
        self.prompt.tick();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaks_within_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WindField::new(&mut rng, WIND_STREAKS, 800.0, 400.0);
        assert_eq!(w.streaks.len(), 40);
        for s in &w.streaks {
            assert!((40.0..100.0).contains(&s.length));
            assert!((0.5..1.5).contains(&s.speed));
            assert!((0.2..0.6).contains(&s.opacity));
            assert!((190.0..210.0).contains(&s.hue));
        }
    }

    #[test]
    fn faster_wind_moves_further() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut calm = WindField::new(&mut rng, 1, 10_000.0, 10.0);
        calm.streaks[0].x = 0.0;
        let start = 0.0;
        calm.tick(0.5);
        let slow = calm.streaks[0].x - start;
        calm.tick(4.5);
        let fast = calm.streaks[0].x - start - slow;
        assert!(fast > slow * 8.0);
    }

    #[test]
    fn streak_wraps_to_the_left() {
        let mut w = WindField {
            streaks: vec![Streak { x: 99.5, y: 0.0, length: 50.0, speed: 1.0, opacity: 0.3, hue: 200.0 }],
            width: 100.0,
        };
        w.tick(1.0);
        assert_eq!(w.streaks[0].x, -50.0);
    }

    #[test]
    fn prompt_fade_completes_once() {
        let mut f = PromptFade::default();
        let done = (0..100).filter(|_| f.tick()).count();
        assert_eq!(done, 1);
        assert_eq!(f.progress, 1.0);
        f.restart();
        assert_eq!(f.progress, 0.0);
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let mut b = Bob::default();
        for _ in 0..500 {
            b.tick();
            assert!(b.offset().abs() <= Bob::AMPLITUDE_PX);
        }
    }

    #[test]
    fn sparks_spread_around_center() {
        let o = Orbit::default();
        let c = Point::new(100.0, 100.0);
        let a = o.spark(0, 4, c, 20.0);
        let b = o.spark(2, 4, c, 20.0);
        assert!((a.distance(c) - 20.0).abs() < 1e-3);
        // opposite sides
        assert!((a.x - c.x) * (b.x - c.x) < 0.0);
    }

    #[test]
    fn seeded_scene_repeats() {
        let a = Scene::new(Some(11), 800.0, 400.0);
        let b = Scene::new(Some(11), 800.0, 400.0);
        assert_eq!(a.wind.streaks, b.wind.streaks);
        assert_eq!(a.crowd, b.crowd);
        assert_eq!(a.crowd.len(), MAX_CROWD_DOTS);
    }
}
