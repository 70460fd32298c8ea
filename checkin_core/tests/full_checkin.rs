//! Walks a whole check-in the way the window drives it: planned route,
//! pointer gestures for every stage, panel scrolling alongside.

use std::time::{Duration, Instant};

use checkin_core::{
    Autocomplete, CheckinError, CheckinSession, EndpointField, EndpointSelection, Gazetteer,
    GridRoute, InputEvent, Layout, MapView, NavigatorConfig, Outcome, Panel, PanelNavigator,
    Point, PointerEvent, RandomEnvironment, Rect, Route, SamplerConfig, Stage,
};

const BED: Rect = Rect::new(100.0, 100.0, 600.0, 400.0);
const FIGURE: Rect = Rect::new(350.0, 200.0, 100.0, 200.0);
const MAP: Rect = Rect::new(40.0, 200.0, 920.0, 340.0);

struct Driver {
    session: CheckinSession,
    t0:      Instant,
    ms:      u64,
}

impl Driver {
    fn now(&mut self, step: u64) -> Instant {
        self.ms += step;
        self.t0 + Duration::from_millis(self.ms)
    }

    fn send(&mut self, p: PointerEvent, layout: &Layout) -> Outcome {
        let at = self.now(16);
        self.session.handle(&InputEvent::new(at, p), layout).unwrap()
    }

    fn click(&mut self, p: Point, layout: &Layout) -> Outcome {
        self.send(PointerEvent::Press(p), layout);
        self.send(PointerEvent::Release(p), layout);
        self.send(PointerEvent::Click(p), layout)
    }
}

fn selection() -> EndpointSelection {
    let g = Gazetteer::manhattan();
    let mut sel = EndpointSelection::new();
    sel.select(EndpointField::Start, g.suggest("washington")[0].clone());
    sel.select(EndpointField::End, g.suggest("bryant")[0].clone());
    sel
}

#[test]
fn full_walkthrough() {
    let t0 = Instant::now();
    let mut d = Driver { session: CheckinSession::new(SamplerConfig::default(), t0), t0, ms: 0 };
    let bed = Layout { container: BED, anchor: FIGURE, map: None };

    // readiness: three quarters up the bed
    let p = Point::new(400.0, 200.0);
    d.send(PointerEvent::Move(p), &bed);
    assert!(matches!(d.click(p, &bed), Outcome::Advanced(_)));
    assert_eq!(d.session.store().get(Stage::Readiness), Some(0.75));

    // temperature: hold for the full ramp and then some
    let p = Point::new(400.0, 300.0);
    d.send(PointerEvent::Press(p), &bed);
    for _ in 0..300 { let now = d.now(16); d.session.tick(now); }
    d.send(PointerEvent::Release(p), &bed);
    assert_eq!(d.session.store().get(Stage::Temperature), Some(1.0));
    // stray click from the hold
    d.send(PointerEvent::Click(p), &bed);
    assert_eq!(d.session.active(), Stage::Charge);

    // charge: a sweep
    for i in 0..10 {
        d.send(PointerEvent::Move(Point::new(100.0 + i as f32 * 16.0, 300.0)), &bed);
    }
    d.click(Point::new(260.0, 300.0), &bed);
    let charge = d.session.store().get(Stage::Charge).unwrap();
    assert!(charge > 0.0 && charge <= 1.0);

    // visibility: right on the figure
    d.click(FIGURE.center(), &bed);
    assert_eq!(d.session.store().get(Stage::Visibility), Some(1.0));
    assert_eq!(d.session.active(), Stage::Sun);

    // route planning
    let route = Route::plan(&selection(), &GridRoute { points: 24 }, &mut RandomEnvironment::new(Some(42))).unwrap();
    let map = MapView::fit(route.bounds(), MAP, 50.0);
    let expected_sun = route.segments()[5].env.sun;
    let target = map.project(route.segments()[5].coord);
    d.session.attach_route(route, d.t0 + Duration::from_millis(d.ms));
    let window = Layout { map: Some(map), ..bed };

    d.send(PointerEvent::Move(target), &window);
    assert_eq!(d.session.hovered_route_index(), Some(5));
    d.click(target, &window);
    assert_eq!(d.session.store().get(Stage::Sun), Some(expected_sun));

    for _ in 0..3 { d.click(target, &window); }
    assert!(d.session.is_complete());

    let record = d.session.record();
    assert_eq!(record.readiness, Some(0.75));
    assert!(record.crowd.is_some());
    let summary = record.route.unwrap();
    assert_eq!(summary.points, 24);
    let json = record.to_json().unwrap();
    assert!(json.contains("\"avg_sun\""));
}

#[test]
fn failed_planning_leaves_session_untouched() {
    let t0 = Instant::now();
    let mut session = CheckinSession::new(SamplerConfig::default(), t0);
    for i in 1..=4 { session.next(t0 + Duration::from_millis(i)).unwrap(); }

    let mut sel = selection();
    sel.clear(EndpointField::End);
    let err = Route::plan(&sel, &GridRoute { points: 8 }, &mut RandomEnvironment::new(Some(1))).unwrap_err();
    assert!(matches!(err, CheckinError::MissingEndpoint(EndpointField::End)));
    assert!(session.route().is_none());
    assert_eq!(session.active(), Stage::Sun);
    assert_eq!(session.record().sun, None);
}

#[test]
fn navigator_runs_beside_the_stages() {
    let t0 = Instant::now();
    let mut nav = PanelNavigator::new(NavigatorConfig::default(), t0);
    let mut session = CheckinSession::new(SamplerConfig::default(), t0);

    nav.on_wheel(120.0, t0 + Duration::from_millis(10));
    nav.on_wheel(120.0, t0 + Duration::from_millis(110));
    assert_eq!(nav.current(), Panel::Bed);
    assert_eq!(session.active().panel(), Panel::Bed);

    session.next(t0 + Duration::from_millis(200)).unwrap();
    assert_eq!(nav.current(), Panel::Bed);
}
