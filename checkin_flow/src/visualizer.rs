//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  question                                                    │
//! │  instruction                                                 │
//! │        ┌────────────── bed / map ───────────────┐            │
//! │        │                                        │            │
//! │        │              figure / route            │            │
//! │        │                                        │            │
//! │        └────────────────────────────────────────┘            │
//! │  status bar                                     ● ○ ○ ○ ○    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the current panel is drawn.  It fades in over the navigator's
//! background colour; the status bar and any notice sit on top, unfaded.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use checkin_core::presentation::{
    blend, hsl_to_argb, sky_gradient, visual, Rgba, Visual, ROUTE_BLUE,
};
use checkin_core::{EndpointField, Panel, Point, Rect, Stage};

use crate::app::AppState;
use crate::gesture::{PointerFrame, RawInput, SimKey};
use crate::FlowError;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1000;
pub const WIN_H:       usize = 600;
const STATUS_H:        usize = 40;
const STATUS_Y:        usize = WIN_H - STATUS_H;

/// The bed's interaction layer.
pub const BED_RECT:    Rect  = Rect::new(200.0, 140.0, 600.0, 360.0);
/// Where the route map is drawn.
pub const MAP_RECT:    Rect  = Rect::new(60.0, 120.0, 880.0, 400.0);
pub const MAP_PADDING: f32   = 50.0;
const FIGURE_W:        f32   = 80.0;
const FIGURE_H:        f32   = 150.0;
/// Gap between the resting figure and the foot of the bed.
const FIGURE_REST:     f32   = 40.0;

const INK:             u32   = 0xFF2C3E50;
const SHEET:           u32   = 0xFFFDFEFE;
const SHEET_EDGE:      u32   = 0xFFB0BEC5;
const FIGURE_COLOR:    u32   = 0xFF34495E;
const SPARK_COLOR:     u32   = 0xFFFFC857;
const CROWD_COLOR:     u32   = 0xFF6D4C41;
const TEXT_BG:         u32   = 0xFF0F3460;
const NOTICE_BG:       u32   = 0xFFC0392B;
const BAR_BG:          u32   = 0xFFE0E6EA;

/// The figure's rectangle for a given lift and bob offset.
pub fn figure_rect(lift_px: f32, bob_px: f32) -> Rect {
    Rect::new(
        BED_RECT.x + (BED_RECT.w - FIGURE_W) / 2.0,
        BED_RECT.y + BED_RECT.h - FIGURE_H - FIGURE_REST - lift_px + bob_px,
        FIGURE_W,
        FIGURE_H,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    raw_tx: Sender<RawInput>,
}

impl Visualizer {
    pub fn new(raw_tx: Sender<RawInput>) -> Result<Self, FlowError> {
        let mut window = Window::new(
            "Check-in",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![SHEET; WIN_W * WIN_H],
            raw_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Sample keys and mouse once and send them as [`RawInput`].
    /// Returns false when the window should close.
    pub fn poll_input(&mut self, now: Instant) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let send = |key: SimKey| { let _ = self.raw_tx.send(RawInput::Key { key, at: now }); };

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            send(SimKey::Quit);
            return false;
        }
        if one_shot(Key::Right) { send(SimKey::PanelForward); }
        if one_shot(Key::Left)  { send(SimKey::PanelBack); }
        if one_shot(Key::N)     { send(SimKey::Next); }
        if one_shot(Key::R)     { send(SimKey::PlanRoute); }

        let frame = PointerFrame {
            at:        now,
            mouse:     self.window.get_mouse_pos(MouseMode::Discard),
            left_down: self.window.get_mouse_down(MouseButton::Left),
            wheel_y:   self.window.get_scroll_wheel().map(|(_, y)| y).unwrap_or(0.0),
        };
        let _ = self.raw_tx.send(RawInput::Frame(frame));
        true
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState, now: Instant) -> Result<(), FlowError> {
        let nav = app.navigator();
        let bg = nav.background(now);
        self.buf.fill(bg);

        let panel = nav.current();
        let fade = nav.opacity(panel, now);

        // ── outgoing panel, kept aside for the cross-dissolve ─────────────
        let outgoing = match nav.previous() {
            Some(prev) if fade < 1.0 => {
                self.draw_panel(app, prev);
                let under = self.buf.clone();
                self.buf.fill(bg);
                Some((under, nav.opacity(prev, now)))
            }
            _ => None,
        };

        self.draw_panel(app, panel);
        self.draw_prompt(app, panel);

        // ── panel cross-fade ──────────────────────────────────────────────
        if fade < 1.0 {
            match outgoing {
                Some((under, out)) => {
                    for (px, old) in self.buf.iter_mut().zip(under) {
                        *px = blend(blend(bg, old, out), *px, fade);
                    }
                }
                None => {
                    for px in self.buf.iter_mut() {
                        *px = blend(bg, *px, fade);
                    }
                }
            }
        }

        self.draw_status(app, panel);
        if let Some(text) = app.notice() {
            self.draw_notice(text);
        }

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H)?;
        Ok(())
    }

    // ── Panels ────────────────────────────────────────────────────────────

    fn draw_panel(&mut self, app: &AppState, panel: Panel) {
        match panel {
            Panel::Intro    => self.draw_intro(),
            Panel::Bed      => self.draw_bed(app),
            Panel::Window   => self.draw_window(app),
            Panel::Wardrobe => self.draw_wardrobe(app),
            Panel::Door     => self.draw_door(app),
        }
    }

    fn draw_intro(&mut self) {
        self.draw_text_centered("GOOD MORNING", 220, 6, INK);
        self.draw_text_centered("A FEW QUESTIONS BEFORE YOU HEAD OUT", 300, 2, INK);
        self.draw_text_centered("SCROLL OR PRESS RIGHT TO BEGIN", 330, 2, 0xFF7F8C8D);
    }

    fn draw_prompt(&mut self, app: &AppState, panel: Panel) {
        let stage = app.session().active();
        if stage.panel() != panel { return; }
        let (instruction, question) = stage.prompt();
        let t = app.scene().prompt.progress;
        let bg = self.buf[0];
        self.draw_text_centered(question, 30, 3, blend(bg, INK, t));
        self.draw_text_centered(instruction, 62, 2, blend(bg, 0xFF5D6D7E, t));
    }

    fn draw_bed(&mut self, app: &AppState) {
        self.fill_rect_f(BED_RECT, SHEET);
        self.draw_border_f(BED_RECT, SHEET_EDGE);

        let fig = app.layout().anchor;
        let head = Point::new(fig.x + fig.w / 2.0, fig.y + 22.0);

        // ── aura ──────────────────────────────────────────────────────────
        if let Some(Visual::Aura { size_px, blur_px, color }) =
            app.value_of(Stage::Temperature).map(|v| visual(Stage::Temperature, v))
        {
            self.soft_circle(fig.center(), size_px / 2.0, blur_px, color);
        }

        // ── figure ────────────────────────────────────────────────────────
        let mut opacity = match app.value_of(Stage::Readiness).map(|v| visual(Stage::Readiness, v)) {
            Some(Visual::Figure { opacity, .. }) => opacity,
            _ => 0.25,
        };
        let veil = app.value_of(Stage::Visibility).map(|v| visual(Stage::Visibility, v));
        if let Some(Visual::Veil { figure_opacity, .. }) = veil {
            opacity *= figure_opacity;
        }
        self.fill_circle(head, 20.0, FIGURE_COLOR, opacity);
        let body = Rect::new(fig.x + 10.0, fig.y + 44.0, fig.w - 20.0, fig.h - 44.0);
        self.overlay_rect(body, Rgba::new(rgb(FIGURE_COLOR), opacity));

        // ── veil ──────────────────────────────────────────────────────────
        if let Some(Visual::Veil { blur_px, .. }) = veil {
            let frost = Rect::new(fig.x - 20.0, fig.y - 20.0, fig.w + 40.0, fig.h + 40.0);
            self.overlay_rect(frost, Rgba::new((255, 255, 255), blur_px / 24.0 * 0.7));
        }

        // ── sparks ────────────────────────────────────────────────────────
        if let Some(Visual::Particles { count }) =
            app.value_of(Stage::Charge).map(|v| visual(Stage::Charge, v))
        {
            let orbit = &app.scene().orbit;
            for i in 0..count {
                let p = orbit.spark(i, count, head, 40.0);
                self.fill_circle(p, 2.5, SPARK_COLOR, 1.0);
            }
        }

        // ── hold meter ────────────────────────────────────────────────────
        if app.session().is_holding() {
            let v = app.session().current_value().unwrap_or(0.0);
            let y = (BED_RECT.y + BED_RECT.h + 12.0) as usize;
            self.draw_bar(BED_RECT.x as usize, y, BED_RECT.w as usize, 8, v, 0xFF96C8FF);
        }
    }

    fn draw_window(&mut self, app: &AppState) {
        let route = app.session().route();

        // ── sky ───────────────────────────────────────────────────────────
        let sky = sky_gradient(route.map(|r| r.time_of_day()).unwrap_or(0.5));
        let (top, h) = (MAP_RECT.y as usize, MAP_RECT.h as usize);
        for row in 0..h {
            let c = sky.at(row as f32 / h as f32);
            self.fill_rect(MAP_RECT.x as usize, top + row, MAP_RECT.w as usize, 1, c);
        }

        let (Some(route), Some(map)) = (route, app.map_view()) else {
            let sel = app.selection();
            let label = |f| sel.get(f).map(|s| s.label.as_str()).unwrap_or("?");
            let line = format!("FROM {} TO {}", label(EndpointField::Start), label(EndpointField::End));
            self.draw_text_centered("PRESS R TO PLAN A ROUTE", 290, 3, 0xFFFFFFFF);
            self.draw_text_centered(&line, 330, 2, 0xFFFFFFFF);
            return;
        };

        // ── route ─────────────────────────────────────────────────────────
        let points: Vec<Point> = route.segments().iter().map(|s| map.project(s.coord)).collect();
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], 3, ROUTE_BLUE);
        }
        for &p in &points {
            self.fill_circle(p, 3.0, ROUTE_BLUE, 1.0);
        }

        // ── environment overlays ──────────────────────────────────────────
        let sun = app.value_of(Stage::Sun).map(|v| visual(Stage::Sun, v));
        if let Some(Visual::Glare { overlay, .. }) = sun {
            self.overlay_rect(MAP_RECT, overlay);
        }
        if app.value_of(Stage::Wind).is_some() {
            for s in &app.scene().wind.streaks {
                let y = MAP_RECT.y + s.y;
                let x0 = MAP_RECT.x + s.x.max(0.0);
                let x1 = (MAP_RECT.x + s.x + s.length).min(MAP_RECT.x + MAP_RECT.w);
                let c = hsl_to_argb(s.hue, 0.7, 0.6);
                let mut x = x0;
                while x < x1 {
                    self.blend_pixel(x as isize, y as isize, c, s.opacity);
                    x += 1.0;
                }
            }
        }
        if let Some(Visual::Shade { overlay }) =
            app.value_of(Stage::Shade).map(|v| visual(Stage::Shade, v))
        {
            self.overlay_rect(MAP_RECT, overlay);
        }
        if let Some(Visual::Crowd { dots }) =
            app.value_of(Stage::Crowd).map(|v| visual(Stage::Crowd, v))
        {
            for &(u, v) in app.scene().crowd.iter().take(dots) {
                let p = Point::new(MAP_RECT.x + u * MAP_RECT.w, MAP_RECT.y + v * MAP_RECT.h);
                self.fill_circle(p, 3.0, CROWD_COLOR, 0.8);
            }
        }

        // ── hovered point ─────────────────────────────────────────────────
        if let Some(i) = app.session().hovered_route_index() {
            let highlight = match (app.session().active(), sun) {
                (Stage::Sun, Some(Visual::Glare { highlight, .. })) => highlight,
                _ => 0xFFFFFFFF,
            };
            self.fill_circle(points[i], 8.0, highlight, 1.0);
            let env = route.segments()[i].env;
            let line = format!(
                "SUN {:.2}  WIND {:.2}  SHADE {:.2}  CROWD {:.2}",
                env.sun, env.wind, env.shade, env.crowd,
            );
            let y = (MAP_RECT.y + MAP_RECT.h) as usize - 18;
            self.draw_text(&line, MAP_RECT.x as usize + 10, y, 2, 0xFFFFFFFF);
        }
        self.draw_border_f(MAP_RECT, SHEET_EDGE);
    }

    fn draw_wardrobe(&mut self, app: &AppState) {
        self.draw_text_centered("WARDROBE", 110, 4, INK);
        let mut y = 170;
        for stage in Stage::ORDER.iter().copied().filter(|s| !s.is_terminal()) {
            self.draw_text(stage.name(), 260, y, 2, INK);
            match app.value_of(stage) {
                Some(v) => {
                    self.draw_bar(420, y, 300, 10, v, ROUTE_BLUE);
                    self.draw_text(&format!("{:.2}", v), 735, y, 2, INK);
                }
                None => self.draw_text("-", 420, y, 2, 0xFF95A5A6),
            }
            y += 36;
        }
    }

    fn draw_door(&mut self, app: &AppState) {
        self.draw_text_centered("DOOR", 110, 4, INK);
        let done = if app.session().is_complete() { "CHECK-IN COMPLETE" } else { "STILL CHECKING IN" };
        self.draw_text_centered(done, 180, 3, INK);

        if let Some(s) = app.record().route {
            let lines = [
                format!("ROUTE {} POINTS", s.points),
                format!("AIR {:.1} C   TIME OF DAY {:.2}", s.air_temperature_c, s.time_of_day),
                format!("AVG SUN {:.2}   AVG WIND {:.2}", s.avg_sun, s.avg_wind),
                format!("AVG SHADE {:.2}   AVG CROWD {:.2}", s.avg_shade, s.avg_crowd),
            ];
            for (i, line) in lines.iter().enumerate() {
                self.draw_text_centered(line, 250 + i * 34, 2, INK);
            }
        }
    }

    // ── Status, notice ────────────────────────────────────────────────────

    fn draw_status(&mut self, app: &AppState, panel: Panel) {
        self.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, TEXT_BG);
        self.draw_text(&app.status, 10, STATUS_Y + 8, 2, 0xFFEEEEEE);
        self.draw_text(
            "WHEEL/LEFT/RIGHT=panel  N=next  R=route  Q=quit",
            10, WIN_H - 10, 1, 0xFF888888,
        );

        // panel dots
        for (i, p) in Panel::ALL.iter().enumerate() {
            let c = Point::new((WIN_W - 120 + i * 20) as f32, (STATUS_Y + 20) as f32);
            let alpha = if *p == panel { 1.0 } else { 0.35 };
            self.fill_circle(c, 5.0, 0xFFFFFFFF, alpha);
        }
    }

    fn draw_notice(&mut self, text: &str) {
        let y = WIN_H / 2 - 40;
        self.fill_rect(0, y, WIN_W, 80, NOTICE_BG);
        self.draw_text_centered(text, y + 20, 3, 0xFFFFFFFF);
        self.draw_text_centered("CLICK TO DISMISS", y + 52, 2, 0xFFF5B7B1);
    }

    fn draw_bar(&mut self, x: usize, y: usize, w: usize, h: usize, value: f32, color: u32) {
        self.fill_rect(x, y, w, h, BAR_BG);
        let filled = (w as f32 * value.clamp(0.0, 1.0)) as usize;
        self.fill_rect(x, y, filled, h, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn fill_rect_f(&mut self, r: Rect, color: u32) {
        self.fill_rect(r.x.max(0.0) as usize, r.y.max(0.0) as usize, r.w as usize, r.h as usize, color);
    }

    fn draw_border_f(&mut self, r: Rect, color: u32) {
        let (x, y, w, h) = (r.x as usize, r.y as usize, r.w as usize, r.h as usize);
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y+h-1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x+w-1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= WIN_W || y as usize >= WIN_H { return; }
        let i = y as usize * WIN_W + x as usize;
        self.buf[i] = blend(self.buf[i], color, alpha);
    }

    fn overlay_rect(&mut self, r: Rect, c: Rgba) {
        if c.a <= 0.0 { return; }
        let color = c.opaque();
        for row in r.y as isize..(r.y + r.h) as isize {
            for col in r.x as isize..(r.x + r.w) as isize {
                self.blend_pixel(col, row, color, c.a);
            }
        }
    }

    fn fill_circle(&mut self, c: Point, r: f32, color: u32, alpha: f32) {
        let (x0, x1) = ((c.x - r).floor() as isize, (c.x + r).ceil() as isize);
        let (y0, y1) = ((c.y - r).floor() as isize, (c.y + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if Point::new(x as f32, y as f32).distance(c) <= r {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// Disc of radius `r` whose edge fades out over `blur` pixels.
    fn soft_circle(&mut self, c: Point, r: f32, blur: f32, color: Rgba) {
        let outer = r + blur / 2.0;
        let inner = (r - blur / 2.0).max(0.0);
        let argb = color.opaque();
        let (x0, x1) = ((c.x - outer) as isize, (c.x + outer) as isize);
        let (y0, y1) = ((c.y - outer) as isize, (c.y + outer) as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Point::new(x as f32, y as f32).distance(c);
                if d > outer { continue; }
                let edge = if d <= inner { 1.0 } else { (outer - d) / (outer - inner).max(1.0) };
                self.blend_pixel(x, y, argb, color.a * edge);
            }
        }
    }

    /// Bresenham with a square brush.
    fn draw_line(&mut self, a: Point, b: Point, thickness: isize, color: u32) {
        let (mut x0, mut y0) = (a.x as isize, a.y as isize);
        let (x1, y1) = (b.x as isize, b.y as isize);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness / 2;
        loop {
            for oy in -half..=half {
                for ox in -half..=half {
                    self.blend_pixel(x0 + ox, y0 + oy, color, 1.0);
                }
            }
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    /// 3×5 bitmap font, each on-bit drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }

    fn draw_text_centered(&mut self, text: &str, y: usize, scale: usize, color: u32) {
        let w = text_width(text, scale);
        self.draw_text(text, WIN_W.saturating_sub(w) / 2, y, scale, color);
    }
}

fn rgb(argb: u32) -> (u8, u8, u8) {
    ((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
}

pub fn text_width(text: &str, scale: usize) -> usize {
    (text.chars().count() * 4).saturating_sub(1) * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_rests_inside_the_bed() {
        let f = figure_rect(0.0, 0.0);
        assert!(BED_RECT.contains(Point::new(f.x, f.y)));
        assert!(f.y + f.h <= BED_RECT.y + BED_RECT.h);
        assert_eq!(f.center().x, BED_RECT.center().x);
    }

    #[test]
    fn full_lift_stays_in_the_bed() {
        let f = figure_rect(60.0, -6.0);
        assert!(f.y > BED_RECT.y);
    }

    #[test]
    fn prompts_fit_the_window() {
        for stage in Stage::ORDER {
            let (instruction, question) = stage.prompt();
            assert!(text_width(question, 3) <= WIN_W, "{}", stage);
            assert!(text_width(instruction, 2) <= WIN_W, "{}", stage);
        }
    }

    #[test]
    fn text_width_counts_gaps() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), 3);
        assert_eq!(text_width("AB", 2), 14);
    }

    #[test]
    fn glyphs_cover_prompt_text() {
        let fallback = char_glyph('\u{1}');
        for stage in Stage::ORDER {
            let (instruction, question) = stage.prompt();
            for ch in instruction.chars().chain(question.chars()) {
                assert!(ch == '.' || char_glyph(ch) != fallback, "no glyph for {:?}", ch);
            }
        }
    }
}
