//! # checkin_flow
//!
//! A morning check-in played out across four panels.  The pointer answers a
//! question per stage; the panels respond as it moves.
//!
//! ## Panels
//!
//! | Panel | Stages | What moves |
//! |---|---|---|
//! | Intro | — | title only |
//! | Bed | readiness, temperature, charge, visibility | figure rises, aura, sparks, veil |
//! | Window | sun, wind, shade, crowd | route over the sky, glare, streaks, shade, dots |
//! | Wardrobe | complete | captured attributes |
//! | Door | — | route summary |
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | mouse wheel / `Right` / `Left` | next / previous panel |
//! | `N` | complete the active stage with what it has |
//! | `R` | plan the route between the chosen endpoints |
//! | `Q` / `Escape` | quit and print the record |

use thiserror::Error;

pub mod gesture;
pub mod scene;
pub mod visualizer;
pub mod app;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("window: {0}")]
    Window(#[from] minifb::Error),

    #[error(transparent)]
    Checkin(#[from] checkin_core::CheckinError),
}
