//! # checkin_core
//!
//! The gesture check-in as plain data: a forward-only stage machine, four
//! gesture samplers that turn pointer input into `[0, 1]` values, a
//! write-once attribute store, the wheel-driven panel navigator and the route
//! model the window stages sample from.
//!
//! No windowing and no clocks of its own: every operation takes the
//! [`Instant`](std::time::Instant) it happens at, so the whole flow can be
//! replayed deterministically.
//!
//! ## Stages
//!
//! | Stage | Gesture | Completes on | Feedback |
//! |---|---|---|---|
//! | readiness | pointer height in the bed | click | figure rises |
//! | temperature | press and hold | release | aura grows |
//! | charge | hover speed | click | sparks |
//! | visibility | distance to the figure | click | veil lifts |
//! | sun | nearest route point | click | glare |
//! | wind | nearest route point | click | streak speed |
//! | shade | nearest route point | click | shade overlay |
//! | crowd | nearest route point | click | crowd dots |
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use checkin_core::{CheckinSession, SamplerConfig, InputEvent, PointerEvent, Layout, Point};
//!
//! let mut session = CheckinSession::new(SamplerConfig::default(), Instant::now());
//! let layout = Layout::default();
//! session.handle(&InputEvent::new(Instant::now(), PointerEvent::Move(Point::new(10.0, 20.0))), &layout)
//!     .unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod navigator;
pub mod places;
pub mod presentation;
pub mod route;
pub mod sampler;
pub mod session;
pub mod stage;
pub mod store;

pub use config::CheckinConfig;
pub use error::{CheckinError, Result};
pub use navigator::{NavigatorConfig, Panel, PanelChange, PanelNavigator};
pub use places::{Autocomplete, EndpointField, EndpointSelection, Gazetteer, Suggestion};
pub use route::{Coord, EnvironmentSource, GridRoute, MapView, RandomEnvironment, Route, RouteProvider};
pub use sampler::{Point, Rect, SamplerConfig};
pub use session::{CheckinSession, Ignored, InputEvent, Layout, Outcome, PointerEvent, Transition};
pub use stage::{Stage, Trigger};
pub use store::{AttributeRecord, AttributeStore};
