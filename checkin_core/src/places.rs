//! Place autocomplete and endpoint selection.
//!
//! The flow only needs two things from a geocoder: a ranked list of labelled
//! coordinates for some typed text, and somewhere to keep the one the user
//! picked for each input field.

use std::fmt;

use serde::Serialize;

use crate::error::{CheckinError, Result};
use crate::route::Coord;

/// Maximum suggestions returned for one query.
pub const SUGGESTION_LIMIT: usize = 5;

/// A selectable place.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub coord: Coord,
}

/// Free text → ranked suggestions.
pub trait Autocomplete {
    fn suggest(&self, query: &str) -> Vec<Suggestion>;
}

// ════════════════════════════════════════════════════════════════════════════
// Gazetteer — offline autocomplete
// ════════════════════════════════════════════════════════════════════════════

/// A fixed list of named places searched in memory.
///
/// Prefix matches rank ahead of substring matches; ties keep list order.
#[derive(Clone, Debug, Default)]
pub struct Gazetteer {
    places: Vec<Suggestion>,
}

impl Gazetteer {
    pub fn new(places: Vec<Suggestion>) -> Self { Gazetteer { places } }

    /// Landmarks around Manhattan, enough to plan walking routes offline.
    pub fn manhattan() -> Self {
        let entries: [(&str, f64, f64); 14] = [
            ("Washington Square Park",    -73.997332, 40.730823),
            ("Union Square",              -73.990494, 40.735863),
            ("Madison Square Park",       -73.987930, 40.742044),
            ("Empire State Building",     -73.985428, 40.748817),
            ("Bryant Park",               -73.983370, 40.753597),
            ("Grand Central Terminal",    -73.977229, 40.752726),
            ("Times Square",              -73.985130, 40.758896),
            ("Rockefeller Center",        -73.978732, 40.758740),
            ("Columbus Circle",           -73.981929, 40.768044),
            ("The High Line",             -74.004821, 40.747993),
            ("Chelsea Market",            -74.006138, 40.742453),
            ("Tompkins Square Park",      -73.981725, 40.726409),
            ("Hudson Yards",              -74.002115, 40.753742),
            ("Gramercy Park",             -73.986233, 40.738208),
        ];
        Gazetteer::new(
            entries.iter()
                .map(|&(label, lng, lat)| Suggestion { label: label.to_string(), coord: Coord::new(lng, lat) })
                .collect(),
        )
    }

    pub fn len(&self) -> usize { self.places.len() }

    pub fn is_empty(&self) -> bool { self.places.is_empty() }
}

impl Autocomplete for Gazetteer {
    fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let q = query.trim().to_lowercase();
        if q.is_empty() { return Vec::new(); }

        let mut ranked: Vec<(u8, &Suggestion)> = self.places.iter()
            .filter_map(|p| {
                let label = p.label.to_lowercase();
                if label.starts_with(&q) {
                    Some((0, p))
                } else if label.contains(&q) {
                    Some((1, p))
                } else {
                    None
                }
            })
            .collect();
        // stable: list order survives within a rank
        ranked.sort_by_key(|(rank, _)| *rank);

        ranked.into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EndpointSelection
// ════════════════════════════════════════════════════════════════════════════

/// The two location inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointField { Start, End }

impl fmt::Display for EndpointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointField::Start => "start",
            EndpointField::End   => "end",
        })
    }
}

/// Chosen suggestion per input field.
#[derive(Clone, Debug, Default)]
pub struct EndpointSelection {
    start: Option<Suggestion>,
    end:   Option<Suggestion>,
}

impl EndpointSelection {
    pub fn new() -> Self { Self::default() }

    pub fn select(&mut self, field: EndpointField, choice: Suggestion) {
        match field {
            EndpointField::Start => self.start = Some(choice),
            EndpointField::End   => self.end   = Some(choice),
        }
    }

    pub fn clear(&mut self, field: EndpointField) {
        match field {
            EndpointField::Start => self.start = None,
            EndpointField::End   => self.end   = None,
        }
    }

    pub fn get(&self, field: EndpointField) -> Option<&Suggestion> {
        match field {
            EndpointField::Start => self.start.as_ref(),
            EndpointField::End   => self.end.as_ref(),
        }
    }

    /// Both coordinates, or the first missing field.
    pub fn coords(&self) -> Result<(Coord, Coord)> {
        let start = self.start.as_ref().ok_or(CheckinError::MissingEndpoint(EndpointField::Start))?;
        let end   = self.end.as_ref().ok_or(CheckinError::MissingEndpoint(EndpointField::End))?;
        Ok((start.coord, end.coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_gives_nothing() {
        let g = Gazetteer::manhattan();
        assert!(g.suggest("").is_empty());
        assert!(g.suggest("   ").is_empty());
    }

    #[test]
    fn prefix_ranks_first() {
        let g = Gazetteer::manhattan();
        let s = g.suggest("square");
        // "Square" only appears mid-label, so everything is a substring hit
        assert!(s.iter().all(|p| p.label.to_lowercase().contains("square")));

        let s = g.suggest("union");
        assert_eq!(s[0].label, "Union Square");

        let g = Gazetteer::new(vec![
            Suggestion { label: "Old Park".into(), coord: Coord::new(0.0, 0.0) },
            Suggestion { label: "Park Row".into(), coord: Coord::new(1.0, 1.0) },
        ]);
        let s = g.suggest("park");
        assert_eq!(s[0].label, "Park Row");
        assert_eq!(s[1].label, "Old Park");
    }

    #[test]
    fn at_most_five() {
        let g = Gazetteer::manhattan();
        assert!(g.suggest("a").len() <= SUGGESTION_LIMIT);
        assert_eq!(g.suggest("a").len(), SUGGESTION_LIMIT);
    }

    #[test]
    fn case_insensitive() {
        let g = Gazetteer::manhattan();
        assert_eq!(g.suggest("BRYANT")[0].label, "Bryant Park");
    }

    #[test]
    fn coords_needs_both_fields() {
        let g = Gazetteer::manhattan();
        let mut sel = EndpointSelection::new();
        assert!(matches!(sel.coords(), Err(CheckinError::MissingEndpoint(EndpointField::Start))));

        sel.select(EndpointField::Start, g.suggest("union")[0].clone());
        assert!(matches!(sel.coords(), Err(CheckinError::MissingEndpoint(EndpointField::End))));

        sel.select(EndpointField::End, g.suggest("bryant")[0].clone());
        let (a, b) = sel.coords().unwrap();
        assert_eq!(a, Coord::new(-73.990494, 40.735863));
        assert_eq!(b, Coord::new(-73.983370, 40.753597));
    }
}
