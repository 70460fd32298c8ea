//! The check-in session: stage machine + installed stage handler + attribute
//! store + planned route, in one explicitly passed object.
//!
//! Exactly one [`StageHandler`] is installed at a time, for the active stage.
//! It is built on stage entry and torn down on exit, taking its gesture
//! context (and any running hold task) with it.  Every event is still checked
//! against the active stage before it can touch anything.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::GestureContext;
use crate::error::{CheckinError, Result};
use crate::route::{MapView, Route};
use crate::sampler::{self, Point, Rect, SamplerConfig};
use crate::stage::{GestureKind, Stage, StageMachine, Trigger};
use crate::store::{AttributeRecord, AttributeStore};

// ════════════════════════════════════════════════════════════════════════════
// Input
// ════════════════════════════════════════════════════════════════════════════

/// Screen geometry the samplers read, supplied fresh with every event because
/// the figure and the map can move between events.
#[derive(Clone, Copy, Debug, Default)]
pub struct Layout {
    /// The bed's interaction layer.
    pub container: Rect,
    /// The figure the proximity sampler measures against.
    pub anchor:    Rect,
    /// The route map, once a route is drawn.
    pub map:       Option<MapView>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Press(Point),
    Release(Point),
    /// Press and release on the same surface.  Follows the `Release`.
    Click(Point),
    Leave,
}

/// One pointer event stamped with a monotonic instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    pub at:      Instant,
    pub pointer: PointerEvent,
}

impl InputEvent {
    pub fn new(at: Instant, pointer: PointerEvent) -> Self { InputEvent { at, pointer } }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcome
// ════════════════════════════════════════════════════════════════════════════

/// Why an event changed nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    /// The session already reached the terminal stage.
    Complete,
    /// The handler's own stage is not the active one.
    StaleStage,
    /// The active stage does not listen to this kind of event.
    NotListening,
    /// A click whose press began before the current stage was installed.
    StalePress,
    /// Not enough input yet to produce a value.
    NoSample,
    /// Pointer outside the route map.
    OffMap,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub from:    Stage,
    pub to:      Stage,
    /// The sealed value of `from`.
    pub value:   f32,
    pub trigger: Trigger,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Ignored(Ignored),
    /// A preview value was sampled and committed.
    Sampled { stage: Stage, value: f32 },
    /// A running gesture was abandoned.
    Cancelled { stage: Stage },
    Advanced(Transition),
}

// ════════════════════════════════════════════════════════════════════════════
// StageHandler
// ════════════════════════════════════════════════════════════════════════════

/// The handler of the active stage and its gesture context.
#[derive(Debug)]
struct StageHandler {
    owner:        Stage,
    context:      GestureContext,
    installed_at: Instant,
}

impl StageHandler {
    fn install(owner: Stage, cfg: &SamplerConfig, at: Instant) -> Self {
        debug!(stage = %owner, "handler installed");
        StageHandler { owner, context: GestureContext::for_stage(owner, cfg), installed_at: at }
    }

    /// Cancel everything the handler started.
    fn uninstall(&mut self) {
        if self.context.cancel() {
            debug!(stage = %self.owner, "hold task cancelled on exit");
        }
        debug!(stage = %self.owner, "handler removed");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CheckinSession
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct CheckinSession {
    config:     SamplerConfig,
    machine:    StageMachine,
    handler:    StageHandler,
    store:      AttributeStore,
    route:      Option<Route>,
    /// Start of the most recent press, whatever stage was active.
    pressed_at: Option<Instant>,
}

impl CheckinSession {
    pub fn new(config: SamplerConfig, now: Instant) -> Self {
        let machine = StageMachine::new();
        let handler = StageHandler::install(machine.active(), &config, now);
        info!(stage = %machine.active(), "check-in started");
        CheckinSession {
            config,
            machine,
            handler,
            store: AttributeStore::new(),
            route: None,
            pressed_at: None,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn active(&self) -> Stage { self.machine.active() }

    pub fn is_active(&self, stage: Stage) -> bool { self.machine.is_active(stage) }

    pub fn is_complete(&self) -> bool { self.machine.is_complete() }

    pub fn store(&self) -> &AttributeStore { &self.store }

    pub fn route(&self) -> Option<&Route> { self.route.as_ref() }

    pub fn config(&self) -> &SamplerConfig { &self.config }

    /// Live value of the active stage, for feedback.
    pub fn current_value(&self) -> Option<f32> { self.handler.context.value() }

    /// Route point under the pointer during a route stage.
    pub fn hovered_route_index(&self) -> Option<usize> { self.handler.context.route_index() }

    pub fn is_holding(&self) -> bool {
        matches!(&self.handler.context, GestureContext::Hold(h) if h.is_holding())
    }

    pub fn record(&self) -> AttributeRecord {
        self.store.record(self.route.as_ref().map(Route::summary))
    }

    /// Attach a freshly planned route.  A route stage in progress starts over
    /// against the new points.
    pub fn attach_route(&mut self, route: Route, now: Instant) {
        self.route = Some(route);
        let active = self.active();
        if matches!(active.gesture(), GestureKind::Route(_)) {
            self.handler.uninstall();
            self.handler = StageHandler::install(active, &self.config, now);
        }
    }

    // ── event handling ───────────────────────────────────────────────────

    /// Route one pointer event to the installed handler.
    pub fn handle(&mut self, event: &InputEvent, layout: &Layout) -> Result<Outcome> {
        let at = event.at;
        if let PointerEvent::Press(_) = event.pointer {
            self.pressed_at = Some(at);
        }

        let owner = self.handler.owner;
        if !self.machine.is_active(owner) {
            return Ok(self.ignore(Ignored::StaleStage));
        }
        if self.machine.is_complete() {
            return Ok(Outcome::Ignored(Ignored::Complete));
        }

        let press_current = self.press_is_current();
        let cfg = &self.config;
        let outcome = match (&mut self.handler.context, event.pointer) {
            // ── vertical position ─────────────────────────────────────────
            (GestureContext::Vertical { value }, PointerEvent::Move(p)) => {
                let v = sampler::vertical_value(p.y, &layout.container);
                *value = Some(v);
                self.preview(owner, v)?
            }
            (GestureContext::Vertical { value }, PointerEvent::Click(p)) => {
                if !press_current { return Ok(self.ignore(Ignored::StalePress)); }
                *value = Some(sampler::vertical_value(p.y, &layout.container));
                self.advance(Trigger::Click, at)?
            }

            // ── hold duration ─────────────────────────────────────────────
            (GestureContext::Hold(hold), PointerEvent::Press(_)) => {
                hold.press(owner, at);
                self.preview(owner, 0.0)?
            }
            (GestureContext::Hold(hold), PointerEvent::Release(_)) => {
                if hold.release(at).is_none() {
                    return Ok(self.ignore(Ignored::NoSample));
                }
                self.advance(Trigger::Release, at)?
            }
            (GestureContext::Hold(hold), PointerEvent::Leave) => {
                if !hold.cancel() {
                    return Ok(self.ignore(Ignored::NotListening));
                }
                debug!(stage = %owner, "hold abandoned");
                Outcome::Cancelled { stage: owner }
            }

            // ── velocity ──────────────────────────────────────────────────
            (GestureContext::Velocity(tracker), PointerEvent::Move(p)) => {
                match tracker.sample(p, at) {
                    Some(v) => self.preview(owner, v)?,
                    None    => return Ok(self.ignore(Ignored::NoSample)),
                }
            }
            (GestureContext::Velocity(tracker), PointerEvent::Leave) => {
                if !tracker.reset() {
                    return Ok(self.ignore(Ignored::NotListening));
                }
                Outcome::Cancelled { stage: owner }
            }
            (GestureContext::Velocity(_), PointerEvent::Click(_)) => {
                if !press_current { return Ok(self.ignore(Ignored::StalePress)); }
                self.advance(Trigger::Click, at)?
            }

            // ── proximity ─────────────────────────────────────────────────
            (GestureContext::Proximity { value }, PointerEvent::Move(p)) => {
                let v = proximity(p, layout, cfg);
                *value = Some(v);
                self.preview(owner, v)?
            }
            (GestureContext::Proximity { value }, PointerEvent::Click(p)) => {
                if !press_current { return Ok(self.ignore(Ignored::StalePress)); }
                *value = Some(proximity(p, layout, cfg));
                self.advance(Trigger::Click, at)?
            }

            // ── route lookup ──────────────────────────────────────────────
            (GestureContext::Route { attribute, index, value }, PointerEvent::Move(p)) => {
                let (Some(route), Some(map)) = (self.route.as_ref(), layout.map.as_ref()) else {
                    return Ok(self.ignore(Ignored::NoSample));
                };
                if !map.rect.contains(p) {
                    return Ok(self.ignore(Ignored::OffMap));
                }
                let i = route.nearest(map.unproject(p));
                let v = route.segments()[i].env.get(*attribute);
                *index = Some(i);
                *value = Some(v);
                self.preview(owner, v)?
            }
            (GestureContext::Route { attribute, index, value }, PointerEvent::Click(p)) => {
                if !press_current { return Ok(self.ignore(Ignored::StalePress)); }
                let Some(route) = self.route.as_ref() else {
                    warn!(stage = %owner, "route stage clicked before a route was planned");
                    return Err(CheckinError::RouteRequired { stage: owner });
                };
                let Some(map) = layout.map.as_ref() else {
                    return Ok(self.ignore(Ignored::OffMap));
                };
                if !map.rect.contains(p) {
                    return Ok(self.ignore(Ignored::OffMap));
                }
                let i = route.nearest(map.unproject(p));
                *index = Some(i);
                *value = Some(route.segments()[i].env.get(*attribute));
                self.advance(Trigger::Click, at)?
            }

            _ => return Ok(self.ignore(Ignored::NotListening)),
        };
        Ok(outcome)
    }

    /// One animation frame.  Drives the hold task; returns its new value.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        let active = self.machine.active();
        let owner = self.handler.owner;
        let GestureContext::Hold(hold) = &mut self.handler.context else { return None };
        let v = hold.tick(active, now)?;
        if let Err(e) = self.store.commit(owner, v) {
            warn!(stage = %owner, error = %e, "hold preview not stored");
        }
        Some(v)
    }

    /// Externally invoked "next": completes the active stage with whatever it
    /// has captured, or the stage default.
    pub fn next(&mut self, at: Instant) -> Result<Outcome> {
        self.advance(Trigger::External, at)
    }

    // ── internals ────────────────────────────────────────────────────────

    fn advance(&mut self, trigger: Trigger, at: Instant) -> Result<Outcome> {
        let from = self.machine.active();
        if from.is_terminal() {
            return Ok(Outcome::Ignored(Ignored::Complete));
        }

        // an external "next" mid-hold latches the hold where it is
        if let GestureContext::Hold(hold) = &mut self.handler.context {
            if hold.is_holding() { hold.release(at); }
        }

        let value = self.value_for(from)?;
        self.store.commit(from, value)?;
        let value = self.store.seal(from).unwrap_or(value);

        self.handler.uninstall();
        let Some((from, to)) = self.machine.step() else {
            return Ok(Outcome::Ignored(Ignored::Complete));
        };
        self.handler = StageHandler::install(to, &self.config, at);

        info!(%from, %to, value, ?trigger, "stage complete");
        Ok(Outcome::Advanced(Transition { from, to, value, trigger }))
    }

    /// Value to seal for `stage`: sampled, else the stage default, else the
    /// route average.
    fn value_for(&self, stage: Stage) -> Result<f32> {
        if let Some(v) = self.handler.context.value() {
            return Ok(v);
        }
        if let Some(v) = stage.default_value() {
            return Ok(v);
        }
        match (stage.gesture(), self.route.as_ref()) {
            (GestureKind::Route(attr), Some(route)) => Ok(route.average(attr)),
            _ => {
                warn!(%stage, "nothing captured and no route to fall back on");
                Err(CheckinError::RouteRequired { stage })
            }
        }
    }

    fn preview(&mut self, stage: Stage, value: f32) -> Result<Outcome> {
        self.store.commit(stage, value)?;
        Ok(Outcome::Sampled { stage, value })
    }

    /// True when the latest press began while the current handler was installed.
    fn press_is_current(&self) -> bool {
        self.pressed_at.is_some_and(|t| t >= self.handler.installed_at)
    }

    fn ignore(&self, why: Ignored) -> Outcome {
        debug!(stage = %self.active(), ?why, "event ignored");
        Outcome::Ignored(why)
    }
}

fn proximity(p: Point, layout: &Layout, cfg: &SamplerConfig) -> f32 {
    sampler::proximity_value(p, layout.anchor.center(), cfg.proximity_max_distance, cfg.proximity_exponent)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
