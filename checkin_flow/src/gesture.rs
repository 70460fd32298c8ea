//! Gesture input: raw per-frame window state → ordered gesture events.
//!
//! The window samples the mouse once per frame and sends a [`RawInput`] over a
//! channel; [`WindowGestureSource`] runs on its own thread, turns edges in that
//! state into `Move / Press / Release / Click / Leave` and forwards them as
//! [`GestureEvent`]s.  Channel order is frame order, so the session sees
//! events in the order the device produced them.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use checkin_core::{InputEvent, Point, PointerEvent};

/// Pixels of scroll per wheel notch reported by the window.
pub const WHEEL_STEP_PX: f32 = 40.0;
/// Wheel delta sent by the panel keys.
pub const KEY_WHEEL_PX: f32 = 100.0;

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Pointer event for the check-in session.
    Pointer(InputEvent),

    /// Scroll intent for the panel navigator.  Positive scrolls forward.
    Wheel { delta_y: f32, at: Instant },

    /// Complete the active stage with whatever it has.
    Next { at: Instant },

    /// Plan the route between the selected endpoints.
    PlanRoute { at: Instant },

    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureEvent`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>);
}

/// Spawn a gesture source on its own thread and return the receiving end.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> Receiver<GestureEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Raw window input
// ════════════════════════════════════════════════════════════════════════════

/// Mouse state sampled once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerFrame {
    pub at:        Instant,
    /// `None` while the pointer is outside the window.
    pub mouse:     Option<(f32, f32)>,
    pub left_down: bool,
    /// Wheel notches this frame, positive = up.
    pub wheel_y:   f32,
}

/// Keys the window forwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Next,         // N
    PlanRoute,    // R
    PanelForward, // Right
    PanelBack,    // Left
    Quit,         // Q, Escape
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawInput {
    Frame(PointerFrame),
    Key { key: SimKey, at: Instant },
}

// ════════════════════════════════════════════════════════════════════════════
// PointerTracker — edge detection over frames
// ════════════════════════════════════════════════════════════════════════════

/// Remembers the previous frame and emits pointer events for what changed.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last: Option<Point>,
    down: bool,
}

impl PointerTracker {
    pub fn new() -> Self { Self::default() }

    pub fn translate(&mut self, frame: PointerFrame) -> Vec<GestureEvent> {
        let at = frame.at;
        let pointer = |p| GestureEvent::Pointer(InputEvent::new(at, p));
        let mut out = Vec::new();

        match frame.mouse {
            None => {
                if self.last.take().is_some() {
                    out.push(pointer(PointerEvent::Leave));
                }
                // a press that leaves the window never completes
                self.down = false;
            }
            Some((x, y)) => {
                let p = Point::new(x, y);
                let entering = self.last.is_none();
                if self.last != Some(p) {
                    out.push(pointer(PointerEvent::Move(p)));
                }
                self.last = Some(p);

                if frame.left_down && !self.down && !entering {
                    out.push(pointer(PointerEvent::Press(p)));
                    self.down = true;
                } else if !frame.left_down && self.down {
                    out.push(pointer(PointerEvent::Release(p)));
                    out.push(pointer(PointerEvent::Click(p)));
                    self.down = false;
                }
            }
        }

        if frame.wheel_y != 0.0 {
            out.push(GestureEvent::Wheel { delta_y: -frame.wheel_y * WHEEL_STEP_PX, at });
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WindowGestureSource
// ════════════════════════════════════════════════════════════════════════════

/// Gesture source driven by [`RawInput`] from the visualizer's window.
pub struct WindowGestureSource {
    pub rx: Receiver<RawInput>,
}

impl GestureSource for WindowGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>) {
        let mut tracker = PointerTracker::new();
        for input in self.rx {
            let events = match input {
                RawInput::Frame(frame) => tracker.translate(frame),
                RawInput::Key { key, at } => match key {
                    SimKey::Next         => vec![GestureEvent::Next { at }],
                    SimKey::PlanRoute    => vec![GestureEvent::PlanRoute { at }],
                    SimKey::PanelForward => vec![GestureEvent::Wheel { delta_y:  KEY_WHEEL_PX, at }],
                    SimKey::PanelBack    => vec![GestureEvent::Wheel { delta_y: -KEY_WHEEL_PX, at }],
                    SimKey::Quit => {
                        let _ = tx.send(GestureEvent::Quit);
                        return;
                    }
                },
            };
            for event in events {
                if tx.send(event).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame(at: Instant, mouse: Option<(f32, f32)>, left_down: bool) -> PointerFrame {
        PointerFrame { at, mouse, left_down, wheel_y: 0.0 }
    }

    fn kinds(events: &[GestureEvent]) -> Vec<PointerEvent> {
        events.iter().filter_map(|e| match e {
            GestureEvent::Pointer(ev) => Some(ev.pointer),
            _ => None,
        }).collect()
    }

    #[test]
    fn still_pointer_emits_nothing() {
        let t = Instant::now();
        let mut tr = PointerTracker::new();
        tr.translate(frame(t, Some((10.0, 10.0)), false));
        assert!(tr.translate(frame(t, Some((10.0, 10.0)), false)).is_empty());
    }

    #[test]
    fn press_release_click_in_order() {
        let t = Instant::now();
        let mut tr = PointerTracker::new();
        tr.translate(frame(t, Some((10.0, 10.0)), false));
        let e = tr.translate(frame(t, Some((10.0, 10.0)), true));
        assert_eq!(kinds(&e), vec![PointerEvent::Press(Point::new(10.0, 10.0))]);
        let e = tr.translate(frame(t, Some((12.0, 10.0)), false));
        let p = Point::new(12.0, 10.0);
        assert_eq!(kinds(&e), vec![PointerEvent::Move(p), PointerEvent::Release(p), PointerEvent::Click(p)]);
    }

    #[test]
    fn leaving_drops_the_press() {
        let t = Instant::now();
        let mut tr = PointerTracker::new();
        tr.translate(frame(t, Some((10.0, 10.0)), false));
        tr.translate(frame(t, Some((10.0, 10.0)), true));
        let e = tr.translate(frame(t, None, true));
        assert_eq!(kinds(&e), vec![PointerEvent::Leave]);
        // back inside with the button up: no release, no click
        let e = tr.translate(frame(t, Some((20.0, 20.0)), false));
        assert_eq!(kinds(&e), vec![PointerEvent::Move(Point::new(20.0, 20.0))]);
        // leaving twice reports once
        tr.translate(frame(t, None, false));
        assert!(tr.translate(frame(t, None, false)).is_empty());
    }

    #[test]
    fn entering_with_button_held_is_not_a_press() {
        let t = Instant::now();
        let mut tr = PointerTracker::new();
        let e = tr.translate(frame(t, Some((5.0, 5.0)), true));
        assert_eq!(kinds(&e), vec![PointerEvent::Move(Point::new(5.0, 5.0))]);
    }

    #[test]
    fn wheel_up_scrolls_back() {
        let t = Instant::now();
        let mut tr = PointerTracker::new();
        let e = tr.translate(PointerFrame { at: t, mouse: None, left_down: false, wheel_y: 1.0 });
        assert_eq!(e, vec![GestureEvent::Wheel { delta_y: -WHEEL_STEP_PX, at: t }]);
    }

    #[test]
    fn source_forwards_in_order_and_stops_on_quit() {
        let (raw_tx, raw_rx) = mpsc::channel();
        let rx = spawn_gesture_source(WindowGestureSource { rx: raw_rx });
        let t = Instant::now();
        raw_tx.send(RawInput::Frame(frame(t, Some((1.0, 1.0)), false))).unwrap();
        raw_tx.send(RawInput::Key { key: SimKey::PanelForward, at: t }).unwrap();
        raw_tx.send(RawInput::Key { key: SimKey::Next, at: t }).unwrap();
        raw_tx.send(RawInput::Key { key: SimKey::Quit, at: t }).unwrap();

        let got: Vec<_> = (0..4).map(|_| rx.recv_timeout(Duration::from_secs(1)).unwrap()).collect();
        assert!(matches!(got[0], GestureEvent::Pointer(_)));
        assert_eq!(got[1], GestureEvent::Wheel { delta_y: KEY_WHEEL_PX, at: t });
        assert_eq!(got[2], GestureEvent::Next { at: t });
        assert_eq!(got[3], GestureEvent::Quit);
    }
}
