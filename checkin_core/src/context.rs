//! Per-stage gesture state.
//!
//! A [`GestureContext`] is built when a stage's handler is installed and
//! dropped when it is removed.  The hold gesture's repeating tick is a
//! [`HoldTask`] owned by the context, so removing the handler also cancels the
//! task; the task additionally carries its owner stage and refuses to run once
//! that stage is no longer active.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::sampler::{self, Point, SamplerConfig};
use crate::stage::{GestureKind, RouteAttribute, Stage};

// ════════════════════════════════════════════════════════════════════════════
// HoldTask
// ════════════════════════════════════════════════════════════════════════════

/// The repeating hold tick, alive between press and release.
#[derive(Debug)]
pub struct HoldTask {
    owner:   Stage,
    started: Instant,
    ramp:    Duration,
    last:    f32,
}

impl HoldTask {
    pub fn owner(&self) -> Stage { self.owner }

    fn sample(&mut self, now: Instant) -> f32 {
        let v = sampler::hold_value(now.saturating_duration_since(self.started), self.ramp);
        // never step backwards, whatever order ticks arrive in
        self.last = self.last.max(v);
        self.last
    }
}

/// Press-and-hold state.
#[derive(Debug)]
pub struct HoldGesture {
    ramp:    Duration,
    task:    Option<HoldTask>,
    latched: Option<f32>,
}

impl HoldGesture {
    fn new(ramp: Duration) -> Self { HoldGesture { ramp, task: None, latched: None } }

    pub fn is_holding(&self) -> bool { self.task.is_some() }

    /// Start (or restart) the tick.
    pub fn press(&mut self, owner: Stage, at: Instant) {
        if self.task.is_some() {
            debug!(stage = %owner, "hold restarted without release");
        }
        self.task = Some(HoldTask { owner, started: at, ramp: self.ramp, last: 0.0 });
        self.latched = Some(0.0);
    }

    /// One animation tick.  A task whose owner is not `active` cancels itself
    /// and writes nothing.
    pub fn tick(&mut self, active: Stage, now: Instant) -> Option<f32> {
        let task = self.task.as_mut()?;
        if task.owner != active {
            debug!(owner = %task.owner, %active, "stale hold task cancelled");
            self.task = None;
            return None;
        }
        let v = task.sample(now);
        self.latched = Some(v);
        Some(v)
    }

    /// Stop the tick and latch the value at `at`.  `None` if nothing was held.
    pub fn release(&mut self, at: Instant) -> Option<f32> {
        let mut task = self.task.take()?;
        let v = task.sample(at);
        self.latched = Some(v);
        Some(v)
    }

    /// Stop the tick, keeping whatever value was reached.
    pub fn cancel(&mut self) -> bool {
        self.task.take().is_some()
    }

    pub fn value(&self) -> Option<f32> { self.latched }
}

// ════════════════════════════════════════════════════════════════════════════
// VelocityTracker
// ════════════════════════════════════════════════════════════════════════════

/// Last pointer sample, needed to turn two moves into a speed.
#[derive(Debug)]
pub struct VelocityTracker {
    scale: f32,
    last:  Option<(Point, Instant)>,
    value: Option<f32>,
}

impl VelocityTracker {
    fn new(scale: f32) -> Self { VelocityTracker { scale, last: None, value: None } }

    /// Record a move.  The first one after stage entry only primes the tracker.
    pub fn sample(&mut self, pos: Point, at: Instant) -> Option<f32> {
        let prev = self.last.replace((pos, at));
        let (p, t) = prev?;
        let elapsed_ms = at.saturating_duration_since(t).as_millis() as f32;
        let v = sampler::velocity_value(p, pos, elapsed_ms, self.scale);
        self.value = Some(v);
        Some(v)
    }

    /// Forget the last point (pointer left the surface).  False if nothing
    /// was primed.
    pub fn reset(&mut self) -> bool { self.last.take().is_some() }

    pub fn value(&self) -> Option<f32> { self.value }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureContext
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum GestureContext {
    Vertical  { value: Option<f32> },
    Hold(HoldGesture),
    Velocity(VelocityTracker),
    Proximity { value: Option<f32> },
    Route     { attribute: RouteAttribute, index: Option<usize>, value: Option<f32> },
    Idle,
}

impl GestureContext {
    /// Fresh context for `stage`.
    pub fn for_stage(stage: Stage, cfg: &SamplerConfig) -> Self {
        match stage.gesture() {
            GestureKind::Vertical  => GestureContext::Vertical { value: None },
            GestureKind::Hold      => GestureContext::Hold(HoldGesture::new(cfg.hold_ramp())),
            GestureKind::Velocity  => GestureContext::Velocity(VelocityTracker::new(cfg.velocity_scale)),
            GestureKind::Proximity => GestureContext::Proximity { value: None },
            GestureKind::Route(attribute) => GestureContext::Route { attribute, index: None, value: None },
            GestureKind::None      => GestureContext::Idle,
        }
    }

    /// Latest sampled value, if any.
    pub fn value(&self) -> Option<f32> {
        match self {
            GestureContext::Vertical { value }
            | GestureContext::Proximity { value }
            | GestureContext::Route { value, .. } => *value,
            GestureContext::Hold(h)     => h.value(),
            GestureContext::Velocity(v) => v.value(),
            GestureContext::Idle        => None,
        }
    }

    /// Route index under the pointer, for highlighting.
    pub fn route_index(&self) -> Option<usize> {
        match self {
            GestureContext::Route { index, .. } => *index,
            _ => None,
        }
    }

    /// Cancel any running task.  Returns true when one was running.
    pub fn cancel(&mut self) -> bool {
        match self {
            GestureContext::Hold(h) => h.cancel(),
            _ => false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
