//! Presentation adapter: a normalized value → cosmetic output.
//!
//! Nothing here feeds back into the stage machine.  Colours are packed ARGB
//! (`0xAARRGGBB`) so a software renderer can use them directly.

use crate::stage::Stage;

/// `#007AFF`, the route line.
pub const ROUTE_BLUE: u32 = 0xFF007AFF;
/// Warm glare tint.
pub const GLARE_RGB: (u8, u8, u8) = (255, 230, 150);
/// Aura tint.
pub const AURA_RGB: (u8, u8, u8) = (150, 200, 255);
const SHADE_RGB: (u8, u8, u8) = (40, 60, 80);

pub const MAX_PARTICLES: usize = 48;
pub const MAX_CROWD_DOTS: usize = 60;

// ════════════════════════════════════════════════════════════════════════════
// Colour helpers
// ════════════════════════════════════════════════════════════════════════════

/// A colour with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn new((r, g, b): (u8, u8, u8), a: f32) -> Self {
        Rgba { r, g, b, a: a.clamp(0.0, 1.0) }
    }

    pub fn opaque(self) -> u32 {
        0xFF000000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Composite over an opaque background.
    pub fn over(self, bg: u32) -> u32 { blend(bg, self.opaque(), self.a) }
}

/// Linear mix of two ARGB colours. `t = 0` → `a`, `t = 1` → `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// HSL (degrees, 0–1, 0–1) → opaque ARGB.
pub fn hsl_to_argb(h: f32, s: f32, l: f32) -> u32 {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to8 = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
    0xFF000000 | (to8(r) << 16) | (to8(g) << 8) | to8(b)
}

// ════════════════════════════════════════════════════════════════════════════
// Visuals
// ════════════════════════════════════════════════════════════════════════════

/// Cosmetic output for one stage value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visual {
    /// Figure rising out of the bed.
    Figure    { opacity: f32, lift_px: f32 },
    /// Glow around the body.
    Aura      { size_px: f32, blur_px: f32, color: Rgba },
    /// Sparks circling the head.
    Particles { count: usize },
    /// Frosted veil over the figure.
    Veil      { blur_px: f32, figure_opacity: f32 },
    /// Sunlight on the window and the hovered route point.
    Glare     { overlay: Rgba, highlight: u32 },
    /// Wind streak speed multiplier.
    Wind      { speed_factor: f32 },
    Shade     { overlay: Rgba },
    Crowd     { dots: usize },
    Rest,
}

pub fn visual(stage: Stage, value: f32) -> Visual {
    let v = value.clamp(0.0, 1.0);
    match stage {
        Stage::Readiness => Visual::Figure { opacity: 0.25 + 0.75 * v, lift_px: 60.0 * v },
        Stage::Temperature => Visual::Aura {
            size_px: 100.0 + v * 150.0,
            blur_px: 40.0 + v * 40.0,
            color:   Rgba::new(AURA_RGB, 0.3 + v * 0.4),
        },
        Stage::Charge => Visual::Particles { count: (v * MAX_PARTICLES as f32).round() as usize },
        Stage::Visibility => Visual::Veil { blur_px: (1.0 - v) * 24.0, figure_opacity: 0.2 + 0.8 * v },
        Stage::Sun => sun_glare(v),
        Stage::Wind => Visual::Wind { speed_factor: 0.5 + v * 4.0 },
        Stage::Shade => Visual::Shade { overlay: Rgba::new(SHADE_RGB, 0.6 * v) },
        Stage::Crowd => Visual::Crowd { dots: (v * MAX_CROWD_DOTS as f32).round() as usize },
        Stage::Complete => Visual::Rest,
    }
}

/// Glare overlay `rgba(255,230,150, 0.2 + 0.6·sun)`; the hovered route point
/// shifts from route blue toward the glare tint.
pub fn sun_glare(sun: f32) -> Visual {
    let sun = sun.clamp(0.0, 1.0);
    let overlay = Rgba::new(GLARE_RGB, 0.2 + sun * 0.6);
    Visual::Glare { overlay, highlight: blend(ROUTE_BLUE, overlay.opaque(), sun) }
}

/// Two-stop sky gradient for a time of day in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyGradient {
    pub bottom: u32,
    pub top:    u32,
}

pub fn sky_gradient(time_of_day: f32) -> SkyGradient {
    let t = time_of_day.clamp(0.0, 1.0);
    SkyGradient {
        bottom: hsl_to_argb(200.0 + t * 80.0, 0.80, (70.0 - t * 30.0) / 100.0),
        top:    hsl_to_argb(220.0 + t * 80.0, 0.60, (90.0 - t * 30.0) / 100.0),
    }
}

impl SkyGradient {
    /// Colour at `y` in `[0, 1]`, 0 at the top.
    pub fn at(&self, y: f32) -> u32 { blend(self.top, self.bottom, y) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
