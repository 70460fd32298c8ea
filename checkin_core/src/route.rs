//! Routes, simulated route environment and the screen projection used to
//! look pointer positions up along a route.
//!
//! The route provider and the environment source are traits: the offline
//! implementations here ([`GridRoute`], [`RandomEnvironment`]) can be swapped
//! for a real directions service or weather feed without touching the
//! samplers or the stage machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CheckinError, Result};
use crate::places::EndpointSelection;
use crate::sampler::{Point, Rect};
use crate::stage::RouteAttribute;

// ════════════════════════════════════════════════════════════════════════════
// Coordinates
// ════════════════════════════════════════════════════════════════════════════

/// Longitude / latitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coord {
    pub lng: f64,
    pub lat: f64,
}

impl Coord {
    pub const fn new(lng: f64, lat: f64) -> Self { Coord { lng, lat } }

    pub fn distance_sq(self, other: Coord) -> f64 {
        let dx = self.lng - other.lng;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }

    fn lerp(self, other: Coord, t: f64) -> Coord {
        Coord::new(self.lng + (other.lng - self.lng) * t, self.lat + (other.lat - self.lat) * t)
    }
}

/// Axis-aligned coordinate bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    pub fn around(first: Coord) -> Self { Bounds { min: first, max: first } }

    pub fn extend(mut self, c: Coord) -> Self {
        self.min.lng = self.min.lng.min(c.lng);
        self.min.lat = self.min.lat.min(c.lat);
        self.max.lng = self.max.lng.max(c.lng);
        self.max.lat = self.max.lat.max(c.lat);
        self
    }

    pub fn center(&self) -> Coord {
        Coord::new((self.min.lng + self.max.lng) / 2.0, (self.min.lat + self.max.lat) / 2.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MapView — bounds fitted into a screen rectangle
// ════════════════════════════════════════════════════════════════════════════

/// Smallest span treated as non-degenerate, in degrees.
const MIN_SPAN: f64 = 1e-6;

/// Aspect-preserving fit of coordinate bounds into a screen rectangle, with
/// padding, latitude growing upward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub rect: Rect,
    center:   Coord,
    /// Pixels per degree.
    scale:    f64,
}

impl MapView {
    pub fn fit(bounds: Bounds, rect: Rect, padding: f32) -> Self {
        let inner_w = (rect.w - 2.0 * padding).max(1.0) as f64;
        let inner_h = (rect.h - 2.0 * padding).max(1.0) as f64;
        let span_lng = (bounds.max.lng - bounds.min.lng).max(MIN_SPAN);
        let span_lat = (bounds.max.lat - bounds.min.lat).max(MIN_SPAN);
        MapView {
            rect,
            center: bounds.center(),
            scale:  (inner_w / span_lng).min(inner_h / span_lat),
        }
    }

    pub fn project(&self, c: Coord) -> Point {
        let mid = self.rect.center();
        Point::new(
            mid.x + ((c.lng - self.center.lng) * self.scale) as f32,
            mid.y - ((c.lat - self.center.lat) * self.scale) as f32,
        )
    }

    pub fn unproject(&self, p: Point) -> Coord {
        let mid = self.rect.center();
        Coord::new(
            self.center.lng + (p.x - mid.x) as f64 / self.scale,
            self.center.lat - (p.y - mid.y) as f64 / self.scale,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Environment
// ════════════════════════════════════════════════════════════════════════════

/// Environment floats attached to one route point, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Environment {
    pub sun:   f32,
    pub wind:  f32,
    pub shade: f32,
    pub crowd: f32,
}

impl Environment {
    pub fn get(&self, attr: RouteAttribute) -> f32 {
        match attr {
            RouteAttribute::Sun   => self.sun,
            RouteAttribute::Wind  => self.wind,
            RouteAttribute::Shade => self.shade,
            RouteAttribute::Crowd => self.crowd,
        }
    }
}

/// Produces the environment of a route.
pub trait EnvironmentSource {
    fn environment(&mut self, index: usize, coord: Coord) -> Environment;
    /// 0 = morning light, 1 = evening.
    fn time_of_day(&mut self) -> f32;
    fn air_temperature_c(&mut self) -> f32;
}

/// Uniform random environment.  Deterministic when seeded.
pub struct RandomEnvironment {
    rng: StdRng,
}

impl RandomEnvironment {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        };
        RandomEnvironment { rng }
    }
}

impl EnvironmentSource for RandomEnvironment {
    fn environment(&mut self, _index: usize, _coord: Coord) -> Environment {
        Environment {
            sun:   self.rng.gen(),
            wind:  self.rng.gen(),
            shade: self.rng.gen(),
            crowd: self.rng.gen(),
        }
    }

    fn time_of_day(&mut self) -> f32 { self.rng.gen() }

    fn air_temperature_c(&mut self) -> f32 { self.rng.gen_range(10.0..30.0) }
}

// ════════════════════════════════════════════════════════════════════════════
// Route providers
// ════════════════════════════════════════════════════════════════════════════

/// Two coordinates → an ordered path.  An empty path means "no route".
pub trait RouteProvider {
    fn route(&self, start: Coord, end: Coord) -> Result<Vec<Coord>>;
}

/// Offline walking route: along the street to the end longitude, then up the
/// avenue, resampled to `points` evenly spaced points.
#[derive(Clone, Debug)]
pub struct GridRoute {
    pub points: usize,
}

impl RouteProvider for GridRoute {
    fn route(&self, start: Coord, end: Coord) -> Result<Vec<Coord>> {
        if start == end { return Ok(Vec::new()); }

        let corner = Coord::new(end.lng, start.lat);
        let leg1 = start.distance_sq(corner).sqrt();
        let leg2 = corner.distance_sq(end).sqrt();
        let total = leg1 + leg2;
        let n = self.points.max(2);

        Ok((0..n).map(|i| {
            let d = total * i as f64 / (n - 1) as f64;
            if d <= leg1 && leg1 > 0.0 {
                start.lerp(corner, d / leg1)
            } else if leg2 > 0.0 {
                corner.lerp(end, ((d - leg1) / leg2).clamp(0.0, 1.0))
            } else {
                end
            }
        }).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Route
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Points requested from the offline provider.
    pub points: usize,
    /// Seed for the simulated environment; entropy when absent.
    pub seed:   Option<u64>,
}

impl Default for RouteConfig {
    fn default() -> Self { RouteConfig { points: 32, seed: None } }
}

/// A route point with its environment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RouteSegment {
    pub coord: Coord,
    #[serde(flatten)]
    pub env:   Environment,
}

/// Route-level floats handed to later panels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RouteSummary {
    pub points:            usize,
    pub avg_sun:           f32,
    pub avg_wind:          f32,
    pub avg_shade:         f32,
    pub avg_crowd:         f32,
    pub time_of_day:       f32,
    pub air_temperature_c: f32,
}

/// A planned route.  Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    segments:          Vec<RouteSegment>,
    time_of_day:       f32,
    air_temperature_c: f32,
}

impl Route {
    /// `None` for an empty segment list.
    pub fn new(segments: Vec<RouteSegment>, time_of_day: f32, air_temperature_c: f32) -> Option<Self> {
        if segments.is_empty() { return None; }
        Some(Route { segments, time_of_day, air_temperature_c })
    }

    /// Resolve the selected endpoints, fetch a path and attach environment.
    ///
    /// Fails without side effects when an endpoint is missing or the provider
    /// finds no path.
    pub fn plan(
        selection: &EndpointSelection,
        provider:  &dyn RouteProvider,
        env:       &mut dyn EnvironmentSource,
    ) -> Result<Route> {
        let (start, end) = selection.coords()?;
        let coords = provider.route(start, end)?;
        if coords.is_empty() {
            warn!(?start, ?end, "route provider returned no path");
            return Err(CheckinError::EmptyRoute);
        }

        let segments: Vec<RouteSegment> = coords.iter().enumerate()
            .map(|(i, &coord)| RouteSegment { coord, env: env.environment(i, coord) })
            .collect();
        let time_of_day = env.time_of_day();
        let air = env.air_temperature_c();

        let route = Route::new(segments, time_of_day, air).ok_or(CheckinError::EmptyRoute)?;
        info!(points = route.len(), time_of_day, "route planned");
        Ok(route)
    }

    pub fn segments(&self) -> &[RouteSegment] { &self.segments }

    pub fn len(&self) -> usize { self.segments.len() }

    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    pub fn time_of_day(&self) -> f32 { self.time_of_day }

    /// Index of the point closest to `c` (squared Euclidean, first wins ties).
    pub fn nearest(&self, c: Coord) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, seg) in self.segments.iter().enumerate() {
            let d = seg.coord.distance_sq(c);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    pub fn average(&self, attr: RouteAttribute) -> f32 {
        let sum: f32 = self.segments.iter().map(|s| s.env.get(attr)).sum();
        sum / self.segments.len() as f32
    }

    pub fn bounds(&self) -> Bounds {
        let first = self.segments[0].coord;
        self.segments.iter().fold(Bounds::around(first), |b, s| b.extend(s.coord))
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            points:            self.len(),
            avg_sun:           self.average(RouteAttribute::Sun),
            avg_wind:          self.average(RouteAttribute::Wind),
            avg_shade:         self.average(RouteAttribute::Shade),
            avg_crowd:         self.average(RouteAttribute::Crowd),
            time_of_day:       self.time_of_day,
            air_temperature_c: self.air_temperature_c,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
