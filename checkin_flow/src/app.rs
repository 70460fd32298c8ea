//! Top-level application state.
//!
//! `AppState` owns the check-in session, the panel navigator, the route
//! collaborators and the animation [`Scene`].  It routes each
//! [`GestureEvent`] to the right owner and surfaces errors as a notice the
//! next click dismisses.

use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use tracing::{debug, info, warn};

use checkin_core::presentation::{visual, Visual};
use checkin_core::{
    Autocomplete, AttributeRecord, CheckinConfig, CheckinError, CheckinSession, EndpointField,
    EndpointSelection, Gazetteer, GridRoute, InputEvent, Layout, MapView, Outcome, PanelNavigator,
    PointerEvent, RandomEnvironment, Route, Stage,
};

use crate::gesture::{spawn_gesture_source, GestureEvent, RawInput, WindowGestureSource};
use crate::scene::Scene;
use crate::visualizer::{figure_rect, Visualizer, BED_RECT, MAP_PADDING, MAP_RECT, WIN_H, WIN_W};
use crate::FlowError;

pub const DEFAULT_START: &str = "Washington Square Park";
pub const DEFAULT_END:   &str = "Bryant Park";

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

pub struct AppConfig {
    pub checkin:   CheckinConfig,
    pub selection: EndpointSelection,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            checkin:   CheckinConfig::default(),
            selection: default_selection(&Gazetteer::manhattan()),
        }
    }
}

/// Best suggestion for `query`, stored in `field`.  Returns its label.
pub fn choose(
    selection: &mut EndpointSelection,
    places:    &dyn Autocomplete,
    field:     EndpointField,
    query:     &str,
) -> Option<String> {
    let pick = places.suggest(query).into_iter().next()?;
    let label = pick.label.clone();
    selection.select(field, pick);
    Some(label)
}

pub fn default_selection(places: &dyn Autocomplete) -> EndpointSelection {
    let mut sel = EndpointSelection::new();
    choose(&mut sel, places, EndpointField::Start, DEFAULT_START);
    choose(&mut sel, places, EndpointField::End, DEFAULT_END);
    sel
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── check-in ──────────────────────────────────────────────────────────
    session:     CheckinSession,
    navigator:   PanelNavigator,

    // ── route collaborators ──────────────────────────────────────────────
    provider:    GridRoute,
    environment: RandomEnvironment,
    selection:   EndpointSelection,

    // ── animation ─────────────────────────────────────────────────────────
    scene:       Scene,
    /// Stage whose prompt is fading in.
    shown_stage: Stage,

    // ── messages ──────────────────────────────────────────────────────────
    pub status:  String,
    /// Blocking notice; the next click dismisses it.
    notice:      Option<String>,
}

impl AppState {
    pub fn new(cfg: AppConfig, now: Instant) -> Self {
        let seed = cfg.checkin.route.seed;
        let session = CheckinSession::new(cfg.checkin.sampler, now);
        let shown_stage = session.active();
        AppState {
            session,
            navigator:   PanelNavigator::new(cfg.checkin.navigator, now),
            provider:    GridRoute { points: cfg.checkin.route.points },
            environment: RandomEnvironment::new(seed),
            selection:   cfg.selection,
            scene:       Scene::new(seed, MAP_RECT.w, MAP_RECT.h),
            shown_stage,
            status:      "Scroll to begin".to_string(),
            notice:      None,
        }
    }

    // ── process one GestureEvent ─────────────────────────────────────────

    pub fn handle_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Pointer(ev) => self.on_pointer(ev),

            GestureEvent::Wheel { delta_y, at } => {
                if let Some(change) = self.navigator.on_wheel(delta_y, at) {
                    self.status = format!("{} -> {}", change.from.title(), change.to.title());
                }
            }

            GestureEvent::Next { at } => {
                let result = self.session.next(at);
                self.on_outcome(result);
            }

            GestureEvent::PlanRoute { at } => self.plan_route(at),

            GestureEvent::Quit => { /* handled in run loop */ }
        }
    }

    fn on_pointer(&mut self, ev: InputEvent) {
        if self.notice.is_some() {
            if let PointerEvent::Click(_) = ev.pointer {
                self.notice = None;
                debug!("notice dismissed");
            }
            return;
        }
        // the session only hears the panel that hosts its active stage, but a
        // hold begun there must still hear its own end
        let ends_hold = self.session.is_holding()
            && matches!(ev.pointer, PointerEvent::Release(_) | PointerEvent::Leave);
        if self.navigator.current() != self.session.active().panel() && !ends_hold {
            return;
        }
        let layout = self.layout();
        let result = self.session.handle(&ev, &layout);
        self.on_outcome(result);
    }

    fn on_outcome(&mut self, result: checkin_core::Result<Outcome>) {
        match result {
            Ok(Outcome::Advanced(t)) => {
                self.status = format!("{} {:.2} - now {}", t.from, t.value, t.to);
            }
            Ok(Outcome::Sampled { stage, value }) => {
                self.status = format!("{} {:.2}", stage, value);
            }
            Ok(Outcome::Cancelled { stage }) => {
                self.status = format!("{} let go", stage);
            }
            Ok(Outcome::Ignored(_)) => {}
            Err(e) => self.surface(e),
        }
    }

    /// Plan a route between the selected endpoints and hand it to the session.
    pub fn plan_route(&mut self, at: Instant) {
        match Route::plan(&self.selection, &self.provider, &mut self.environment) {
            Ok(route) => {
                self.status = format!("Route planned, {} points", route.len());
                self.session.attach_route(route, at);
            }
            Err(e) => self.surface(e),
        }
    }

    fn surface(&mut self, e: CheckinError) {
        warn!(error = %e, stage = %self.session.active(), "check-in notice");
        self.notice = Some(e.to_string());
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        self.session.tick(now);

        let active = self.session.active();
        if active != self.shown_stage {
            self.shown_stage = active;
            self.scene.prompt.restart();
            if self.session.is_complete() {
                info!("check-in complete");
            }
        }
        self.scene.tick(self.wind_speed_factor());
    }

    // ── Derived values ────────────────────────────────────────────────────

    /// Sealed value of `stage`, or its live value while it is active.
    pub fn value_of(&self, stage: Stage) -> Option<f32> {
        if let Some(v) = self.session.store().get(stage) {
            return Some(v);
        }
        if self.session.is_active(stage) {
            return self.session.current_value().or(stage.default_value());
        }
        None
    }

    pub fn wind_speed_factor(&self) -> f32 {
        match visual(Stage::Wind, self.value_of(Stage::Wind).unwrap_or(0.0)) {
            Visual::Wind { speed_factor } => speed_factor,
            _ => 1.0,
        }
    }

    pub fn map_view(&self) -> Option<MapView> {
        self.session.route().map(|r| MapView::fit(r.bounds(), MAP_RECT, MAP_PADDING))
    }

    /// Geometry the samplers read, as currently drawn.
    pub fn layout(&self) -> Layout {
        let lift = match self.value_of(Stage::Readiness).map(|v| visual(Stage::Readiness, v)) {
            Some(Visual::Figure { lift_px, .. }) => lift_px,
            _ => 0.0,
        };
        Layout {
            container: BED_RECT,
            anchor:    figure_rect(lift, self.scene.bob.offset()),
            map:       self.map_view(),
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn session(&self)   -> &CheckinSession    { &self.session }
    pub fn navigator(&self) -> &PanelNavigator    { &self.navigator }
    pub fn scene(&self)     -> &Scene             { &self.scene }
    pub fn selection(&self) -> &EndpointSelection { &self.selection }
    pub fn notice(&self)    -> Option<&str>       { self.notice.as_deref() }
    pub fn record(&self)    -> AttributeRecord    { self.session.record() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the window until it closes or the user quits, then return the
/// attribute record.
pub fn run(cfg: AppConfig) -> Result<AttributeRecord, FlowError> {
    // ── gesture channel ───────────────────────────────────────────────────
    let (raw_tx, raw_rx) = mpsc::channel::<RawInput>();
    let gesture_rx = spawn_gesture_source(WindowGestureSource { rx: raw_rx });

    // ── visualizer (owns the window and the raw input sender) ────────────
    let mut vis = Visualizer::new(raw_tx)?;
    info!(width = WIN_W, height = WIN_H, "window open");

    let mut app = AppState::new(cfg, Instant::now());

    while vis.is_open() {
        // 1. Poll window input → RawInput
        if !vis.poll_input(Instant::now()) { break; }

        // 2. Drain gesture events
        loop {
            match gesture_rx.try_recv() {
                Ok(GestureEvent::Quit)          => return Ok(app.record()),
                Ok(evt)                         => app.handle_gesture(evt),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(app.record()),
            }
        }

        // 3. Per-frame logic
        let now = Instant::now();
        app.tick(now);

        // 4. Render
        vis.render(&app, now)?;
    }

    Ok(app.record())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::{Panel, Point};
    use std::time::Duration;

    fn seeded() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.checkin.route.seed = Some(5);
        cfg
    }

    fn at(t0: Instant, ms: u64) -> Instant { t0 + Duration::from_millis(ms) }

    fn pointer(t: Instant, p: PointerEvent) -> GestureEvent {
        GestureEvent::Pointer(InputEvent::new(t, p))
    }

    fn click(app: &mut AppState, t: Instant, p: Point) {
        app.handle_gesture(pointer(t, PointerEvent::Press(p)));
        app.handle_gesture(pointer(t + Duration::from_millis(5), PointerEvent::Release(p)));
        app.handle_gesture(pointer(t + Duration::from_millis(6), PointerEvent::Click(p)));
    }

    /// Scroll forward `n` panels, each past the debounce.
    fn scroll(app: &mut AppState, t0: Instant, n: u64) {
        for i in 0..n {
            app.handle_gesture(GestureEvent::Wheel { delta_y: 100.0, at: at(t0, 10 + i * 1000) });
        }
    }

    #[test]
    fn default_endpoints_resolve() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.selection.get(EndpointField::Start).unwrap().label, DEFAULT_START);
        assert_eq!(cfg.selection.get(EndpointField::End).unwrap().label, DEFAULT_END);
    }

    #[test]
    fn pointer_ignored_off_panel() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        assert_eq!(app.navigator().current(), Panel::Intro);
        let top = Point::new(400.0, BED_RECT.y);
        app.handle_gesture(pointer(at(t0, 5), PointerEvent::Move(top)));
        click(&mut app, at(t0, 10), top);
        assert_eq!(app.session().current_value(), None);
        assert_eq!(app.session().active(), Stage::Readiness);
    }

    #[test]
    fn readiness_on_the_bed_panel() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        scroll(&mut app, t0, 1);
        assert_eq!(app.navigator().current(), Panel::Bed);

        click(&mut app, at(t0, 100), Point::new(400.0, BED_RECT.y));
        assert_eq!(app.session().store().get(Stage::Readiness), Some(1.0));
        assert_eq!(app.session().active(), Stage::Temperature);
        // the figure rose with it
        assert!(app.layout().anchor.y < figure_rect(0.0, 0.0).y - 40.0);
    }

    #[test]
    fn hold_released_after_scrolling_away() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        scroll(&mut app, t0, 1);
        app.handle_gesture(GestureEvent::Next { at: at(t0, 20) });
        assert_eq!(app.session().active(), Stage::Temperature);

        let p = BED_RECT.center();
        app.handle_gesture(pointer(at(t0, 100), PointerEvent::Press(p)));
        assert!(app.session().is_holding());
        app.handle_gesture(GestureEvent::Wheel { delta_y: -100.0, at: at(t0, 850) });
        assert_eq!(app.navigator().current(), Panel::Intro);

        app.handle_gesture(pointer(at(t0, 900), PointerEvent::Release(p)));
        app.handle_gesture(pointer(at(t0, 901), PointerEvent::Click(p)));
        assert!(!app.session().is_holding());

        for i in 0..300 { app.tick(at(t0, 1000 + i * 16)); }
        app.handle_gesture(GestureEvent::Next { at: at(t0, 6000) });
        let held = app.session().store().get(Stage::Temperature).unwrap();
        assert!((held - 0.2).abs() < 1e-6);
    }

    #[test]
    fn leave_while_scrolled_away_cancels_the_hold() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        scroll(&mut app, t0, 1);
        app.handle_gesture(GestureEvent::Next { at: at(t0, 20) });

        app.handle_gesture(pointer(at(t0, 100), PointerEvent::Press(BED_RECT.center())));
        app.handle_gesture(GestureEvent::Wheel { delta_y: -100.0, at: at(t0, 850) });
        app.handle_gesture(pointer(at(t0, 900), PointerEvent::Leave));
        assert!(!app.session().is_holding());
        assert_eq!(app.session().active(), Stage::Temperature);

        // other pointer traffic stays gated
        app.handle_gesture(pointer(at(t0, 950), PointerEvent::Press(BED_RECT.center())));
        assert!(!app.session().is_holding());
    }

    #[test]
    fn wheel_burst_moves_one_panel() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        app.handle_gesture(GestureEvent::Wheel { delta_y: 100.0, at: at(t0, 10) });
        app.handle_gesture(GestureEvent::Wheel { delta_y: 100.0, at: at(t0, 110) });
        assert_eq!(app.navigator().index(), 1);
    }

    #[test]
    fn missing_endpoint_shows_notice_and_keeps_state() {
        let t0 = Instant::now();
        let cfg = AppConfig { selection: EndpointSelection::new(), ..seeded() };
        let mut app = AppState::new(cfg, t0);
        app.plan_route(at(t0, 1));
        assert!(app.notice().is_some());
        assert!(app.session().route().is_none());

        // the next click only dismisses it
        scroll(&mut app, t0, 1);
        click(&mut app, at(t0, 100), Point::new(400.0, BED_RECT.y));
        assert!(app.notice().is_none());
        assert_eq!(app.session().active(), Stage::Readiness);
    }

    #[test]
    fn planned_route_reaches_the_session() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        app.handle_gesture(GestureEvent::PlanRoute { at: at(t0, 1) });
        assert!(app.notice().is_none());
        let route = app.session().route().unwrap();
        assert_eq!(route.len(), 32);
        assert!(app.map_view().is_some());
    }

    #[test]
    fn route_stage_click_without_route_is_a_notice() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        scroll(&mut app, t0, 2);
        assert_eq!(app.navigator().current(), Panel::Window);
        for i in 0..4 { app.handle_gesture(GestureEvent::Next { at: at(t0, 3000 + i) }); }
        assert_eq!(app.session().active(), Stage::Sun);

        click(&mut app, at(t0, 3100), MAP_RECT.center());
        assert!(app.notice().unwrap().contains("needs a planned route"));
        assert_eq!(app.session().active(), Stage::Sun);
    }

    #[test]
    fn route_stages_complete_from_the_map() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        scroll(&mut app, t0, 2);
        for i in 0..4 { app.handle_gesture(GestureEvent::Next { at: at(t0, 3000 + i) }); }
        app.plan_route(at(t0, 3010));

        let map = app.map_view().unwrap();
        let first = app.session().route().unwrap().segments()[0];
        let p = map.project(first.coord);
        for i in 0..4 { click(&mut app, at(t0, 3100 + i * 50), p); }
        assert!(app.session().is_complete());
        assert_eq!(app.record().sun, Some(first.env.sun));
        assert_eq!(app.record().crowd, Some(first.env.crowd));
    }

    #[test]
    fn stage_change_restarts_prompt() {
        let t0 = Instant::now();
        let mut app = AppState::new(seeded(), t0);
        for i in 0..30 { app.tick(at(t0, i * 16)); }
        assert_eq!(app.scene().prompt.progress, 1.0);
        app.handle_gesture(GestureEvent::Next { at: at(t0, 600) });
        app.tick(at(t0, 616));
        assert!(app.scene().prompt.progress < 0.1);
    }

    #[test]
    fn wind_factor_follows_the_wind_value() {
        let t0 = Instant::now();
        let app = AppState::new(seeded(), t0);
        assert_eq!(app.wind_speed_factor(), 0.5);
    }
}
