//! Stage identifiers and the forward-only stage machine.
//!
//! The check-in walks a fixed linear order:
//!
//! ```text
//! Readiness → Temperature → Charge → Visibility      (bed panel)
//!           → Sun → Wind → Shade → Crowd             (window panel)
//!           → Complete                               (terminal)
//! ```
//!
//! Every handler in the session asks [`StageMachine::is_active`] before it
//! touches anything; that single equality check is what keeps one stage's
//! gesture from bleeding into the next.

use std::fmt;

use serde::Serialize;

use crate::navigator::Panel;

// ════════════════════════════════════════════════════════════════════════════
// Stage
// ════════════════════════════════════════════════════════════════════════════

/// One step of the guided interaction.
///
/// Declaration order is flow order; `Ord` follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Readiness,
    Temperature,
    Charge,
    Visibility,
    Sun,
    Wind,
    Shade,
    Crowd,
    Complete,
}

/// Which sampler a stage reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    /// Pointer height inside the bed container.
    Vertical,
    /// Press-and-hold duration.
    Hold,
    /// Hover speed.
    Velocity,
    /// Distance to the figure anchor.
    Proximity,
    /// Nearest route point, reading one environment attribute.
    Route(RouteAttribute),
    /// Terminal stage, listens to nothing.
    None,
}

/// Environment attribute carried by every route point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAttribute { Sun, Wind, Shade, Crowd }

/// What completed a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Pointer click (position, velocity, proximity and route stages).
    Click,
    /// Pointer release after a hold.
    Release,
    /// An externally invoked "next".
    External,
}

impl Stage {
    /// Every stage in flow order.
    pub const ORDER: [Stage; 9] = [
        Stage::Readiness,
        Stage::Temperature,
        Stage::Charge,
        Stage::Visibility,
        Stage::Sun,
        Stage::Wind,
        Stage::Shade,
        Stage::Crowd,
        Stage::Complete,
    ];

    pub const FIRST: Stage = Stage::Readiness;

    /// The following stage, or `None` from the terminal stage.
    pub fn next(self) -> Option<Stage> {
        let i = Self::ORDER.iter().position(|&s| s == self)?;
        Self::ORDER.get(i + 1).copied()
    }

    pub fn is_terminal(self) -> bool { self == Stage::Complete }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Readiness   => "readiness",
            Stage::Temperature => "temperature",
            Stage::Charge      => "charge",
            Stage::Visibility  => "visibility",
            Stage::Sun         => "sun",
            Stage::Wind        => "wind",
            Stage::Shade       => "shade",
            Stage::Crowd       => "crowd",
            Stage::Complete    => "complete",
        }
    }

    pub fn gesture(self) -> GestureKind {
        match self {
            Stage::Readiness   => GestureKind::Vertical,
            Stage::Temperature => GestureKind::Hold,
            Stage::Charge      => GestureKind::Velocity,
            Stage::Visibility  => GestureKind::Proximity,
            Stage::Sun         => GestureKind::Route(RouteAttribute::Sun),
            Stage::Wind        => GestureKind::Route(RouteAttribute::Wind),
            Stage::Shade       => GestureKind::Route(RouteAttribute::Shade),
            Stage::Crowd       => GestureKind::Route(RouteAttribute::Crowd),
            Stage::Complete    => GestureKind::None,
        }
    }

    /// The pointer trigger that completes this stage.
    pub fn completion(self) -> Option<Trigger> {
        match self.gesture() {
            GestureKind::Hold => Some(Trigger::Release),
            GestureKind::None => None,
            _                 => Some(Trigger::Click),
        }
    }

    /// Panel the stage lives on.
    pub fn panel(self) -> Panel {
        match self {
            Stage::Readiness | Stage::Temperature | Stage::Charge | Stage::Visibility => Panel::Bed,
            Stage::Sun | Stage::Wind | Stage::Shade | Stage::Crowd => Panel::Window,
            Stage::Complete => Panel::Wardrobe,
        }
    }

    /// Value committed when the stage completes with nothing sampled.
    ///
    /// Route stages have no fixed default; they fall back to the route average.
    pub fn default_value(self) -> Option<f32> {
        match self {
            Stage::Readiness   => Some(0.5),
            Stage::Temperature => Some(0.0),
            Stage::Charge      => Some(0.0),
            Stage::Visibility  => Some(0.5),
            _                  => None,
        }
    }

    /// Instruction shown while the stage is active, and its question.
    pub fn prompt(self) -> (&'static str, &'static str) {
        match self {
            Stage::Readiness   => ("Slide along the bed, higher means ready to rise.",
                                   "How ready are you?"),
            Stage::Temperature => ("Press and hold, let the warmth gather.",
                                   "How warm do you feel inside?"),
            Stage::Charge      => ("Sweep across the sheets.",
                                   "How charged is your mind?"),
            Stage::Visibility  => ("Drift toward the figure.",
                                   "How seen do you want to be today?"),
            Stage::Sun         => ("Hover across the route, feel the brightness shift.",
                                   "Is today about brilliance or calm?"),
            Stage::Wind        => ("Hover over the route, feel the wind's motion.",
                                   "Is the air calm or rushing?"),
            Stage::Shade       => ("Seek out the shaded paths.",
                                   "Do you want cover or open sky?"),
            Stage::Crowd       => ("Find the busy corners.",
                                   "How much company do you want?"),
            Stage::Complete    => ("Check-in complete.",
                                   "Scroll on to get dressed."),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StageMachine
// ════════════════════════════════════════════════════════════════════════════

/// Holds the single active stage.
#[derive(Debug)]
pub struct StageMachine {
    active: Stage,
}

impl Default for StageMachine {
    fn default() -> Self { StageMachine { active: Stage::FIRST } }
}

impl StageMachine {
    pub fn new() -> Self { Self::default() }

    pub fn active(&self) -> Stage { self.active }

    pub fn is_active(&self, stage: Stage) -> bool { self.active == stage }

    pub fn is_complete(&self) -> bool { self.active.is_terminal() }

    /// Step to the next stage. Returns `(from, to)`, or `None` when already
    /// terminal (in which case nothing changes).
    pub fn step(&mut self) -> Option<(Stage, Stage)> {
        let from = self.active;
        let to = from.next()?;
        self.active = to;
        Some((from, to))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_linear_and_ends_at_complete() {
        let mut s = Stage::FIRST;
        let mut seen = vec![s];
        while let Some(n) = s.next() {
            assert!(n > s);
            seen.push(n);
            s = n;
        }
        assert_eq!(seen, Stage::ORDER.to_vec());
        assert_eq!(s, Stage::Complete);
    }

    #[test]
    fn step_is_forward_only() {
        let mut m = StageMachine::new();
        assert!(m.is_active(Stage::Readiness));
        assert_eq!(m.step(), Some((Stage::Readiness, Stage::Temperature)));
        assert!(m.is_active(Stage::Temperature));
        assert!(!m.is_active(Stage::Readiness));
    }

    #[test]
    fn step_at_terminal_is_noop() {
        let mut m = StageMachine::new();
        for _ in 0..Stage::ORDER.len() - 1 { assert!(m.step().is_some()); }
        assert!(m.is_complete());
        assert_eq!(m.step(), None);
        assert_eq!(m.step(), None);
        assert_eq!(m.active(), Stage::Complete);
    }

    #[test]
    fn hold_stage_completes_on_release() {
        assert_eq!(Stage::Temperature.completion(), Some(Trigger::Release));
        assert_eq!(Stage::Readiness.completion(), Some(Trigger::Click));
        assert_eq!(Stage::Complete.completion(), None);
    }

    #[test]
    fn stages_sit_on_their_panels() {
        assert_eq!(Stage::Charge.panel(), Panel::Bed);
        assert_eq!(Stage::Shade.panel(), Panel::Window);
    }

    #[test]
    fn serializes_snake_case() {
        let s = serde_json::to_string(&Stage::Visibility).unwrap();
        assert_eq!(s, "\"visibility\"");
    }
}
