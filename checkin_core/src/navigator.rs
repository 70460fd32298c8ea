//! Wheel-driven panel navigator.
//!
//! Independent of the stage machine: it only decides which panel is on
//! screen, how far the panel strip is translated, how the cross-fade is
//! progressing and what colour the background is.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

/// The panels of the flow, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Panel {
    Intro,
    Bed,
    Window,
    Wardrobe,
    Door,
}

impl Panel {
    pub const ALL: [Panel; 5] = [Panel::Intro, Panel::Bed, Panel::Window, Panel::Wardrobe, Panel::Door];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&p| p == self).unwrap_or(0)
    }

    /// Settled background colour (ARGB).
    pub fn background(self) -> u32 {
        match self {
            Panel::Intro    => 0xFFF1F8FF,
            Panel::Bed      => 0xFFE7F4EC,
            Panel::Window   => 0xFFFFF5F7,
            Panel::Wardrobe => 0xFFF7FAFF,
            Panel::Door     => 0xFFEEF5F8,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Intro    => "Intro",
            Panel::Bed      => "Bed",
            Panel::Window   => "Window",
            Panel::Wardrobe => "Wardrobe",
            Panel::Door     => "Door",
        }
    }
}

/// Background shown while a transition is still settling.
pub const TRANSITION_BACKGROUND: u32 = 0xFFFFFFFF;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Minimum |deltaY| that counts as a scroll intent.
    pub wheel_threshold:     f32,
    /// Quiet period after an accepted transition.
    pub debounce_ms:         u64,
    /// Delay before the panel colour replaces the transition background.
    pub background_delay_ms: u64,
    /// Cross-fade length.
    pub fade_ms:             u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        NavigatorConfig {
            wheel_threshold:     30.0,
            debounce_ms:         800,
            background_delay_ms: 400,
            fade_ms:             600,
        }
    }
}

/// An accepted panel change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelChange {
    pub from: Panel,
    pub to:   Panel,
}

#[derive(Debug)]
pub struct PanelNavigator {
    config:        NavigatorConfig,
    index:         usize,
    last_accepted: Option<Instant>,
    /// Panel fading out behind the current one.
    previous:      Option<usize>,
    /// When the current fade started; the first panel fades in at construction.
    fade_started:  Instant,
}

impl PanelNavigator {
    pub fn new(config: NavigatorConfig, now: Instant) -> Self {
        PanelNavigator { config, index: 0, last_accepted: None, previous: None, fade_started: now }
    }

    pub fn index(&self) -> usize { self.index }

    pub fn current(&self) -> Panel { Panel::ALL[self.index] }

    pub fn is_last(&self) -> bool { self.index == Panel::ALL.len() - 1 }

    /// Feed one wheel event.  Positive `delta_y` scrolls forward.
    pub fn on_wheel(&mut self, delta_y: f32, now: Instant) -> Option<PanelChange> {
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < Duration::from_millis(self.config.debounce_ms) {
                debug!(delta_y, "wheel debounced");
                return None;
            }
        }

        let from = self.current();
        let from_index = self.index;
        let t = self.config.wheel_threshold;
        if delta_y > t && !self.is_last() {
            self.index += 1;
        } else if delta_y < -t && self.index > 0 {
            self.index -= 1;
        } else {
            return None;
        }

        self.last_accepted = Some(now);
        self.previous = Some(from_index);
        self.fade_started = now;
        let change = PanelChange { from, to: self.current() };
        debug!(from = from.title(), to = change.to.title(), "panel change");
        Some(change)
    }

    /// Horizontal translation of the panel strip, in viewport widths.
    pub fn offset_vw(&self) -> f32 { self.index as f32 * 100.0 }

    /// Background colour at `now`: white until the delay has passed.
    pub fn background(&self, now: Instant) -> u32 {
        let delay = Duration::from_millis(self.config.background_delay_ms);
        if now.saturating_duration_since(self.fade_started) < delay {
            TRANSITION_BACKGROUND
        } else {
            self.current().background()
        }
    }

    /// Cross-fade progress in `[0, 1]`.
    pub fn fade_progress(&self, now: Instant) -> f32 {
        let fade = self.config.fade_ms;
        if fade == 0 { return 1.0; }
        let elapsed = now.saturating_duration_since(self.fade_started).as_millis() as f32;
        (elapsed / fade as f32).clamp(0.0, 1.0)
    }

    /// Panel that was current before the last change, if any.
    pub fn previous(&self) -> Option<Panel> { self.previous.map(|i| Panel::ALL[i]) }

    /// Opacity of one panel: the active one fades in while the one it
    /// replaced fades out.  Every other panel is hidden.
    pub fn opacity(&self, panel: Panel, now: Instant) -> f32 {
        let p = self.fade_progress(now);
        if panel.index() == self.index {
            p
        } else if self.previous == Some(panel.index()) {
            1.0 - p
        } else {
            0.0
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
