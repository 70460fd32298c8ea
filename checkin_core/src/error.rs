//! Error type shared by the session, the route planner and config loading.
//!
//! Stale events are not errors: they come back as
//! [`Outcome::Ignored`](crate::session::Outcome) and are never reported.

use crate::places::EndpointField;
use crate::stage::Stage;

/// Everything that can stop a check-in operation.
///
/// None of these are fatal: the worst case is that the active stage does not
/// advance and the session is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    /// A route was requested before both endpoints were picked.
    #[error("select a {0} location from the suggestions before planning a route")]
    MissingEndpoint(EndpointField),

    /// A route stage was asked to capture a value with no route planned.
    #[error("{stage} needs a planned route")]
    RouteRequired { stage: Stage },

    /// The route provider found no path between the endpoints.
    #[error("no route found, try different locations")]
    EmptyRoute,

    /// A value was committed for a stage whose transition already fired.
    #[error("{stage} is already sealed")]
    AlreadySealed { stage: Stage },

    /// NaN or infinite value offered to the attribute store.
    #[error("{stage} rejected non-finite value {value}")]
    InvalidValue { stage: Stage, value: f32 },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stage() {
        let e = CheckinError::RouteRequired { stage: Stage::Wind };
        assert_eq!(e.to_string(), "wind needs a planned route");

        let e = CheckinError::MissingEndpoint(EndpointField::End);
        assert!(e.to_string().contains("end"));
    }
}
