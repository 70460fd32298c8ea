//! Attribute store: stage → captured value, sealed at the stage transition.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{CheckinError, Result};
use crate::route::RouteSummary;
use crate::stage::Stage;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Slot {
    /// Written while the stage is still active; may be overwritten.
    Preview(f32),
    /// Frozen by the stage transition.
    Sealed(f32),
}

#[derive(Debug, Default)]
pub struct AttributeStore {
    slots: BTreeMap<Stage, Slot>,
}

impl AttributeStore {
    pub fn new() -> Self { Self::default() }

    /// Write `value` for a stage that has not completed yet.
    pub fn commit(&mut self, stage: Stage, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(CheckinError::InvalidValue { stage, value });
        }
        match self.slots.get(&stage) {
            Some(Slot::Sealed(_)) => Err(CheckinError::AlreadySealed { stage }),
            _ => {
                self.slots.insert(stage, Slot::Preview(value));
                Ok(())
            }
        }
    }

    /// Freeze the stage's last committed value.  Returns it.
    pub(crate) fn seal(&mut self, stage: Stage) -> Option<f32> {
        let slot = self.slots.get_mut(&stage)?;
        let v = match *slot {
            Slot::Preview(v) | Slot::Sealed(v) => v,
        };
        *slot = Slot::Sealed(v);
        Some(v)
    }

    /// The sealed value; `None` until the stage has completed.
    pub fn get(&self, stage: Stage) -> Option<f32> {
        match self.slots.get(&stage)? {
            Slot::Sealed(v)  => Some(*v),
            Slot::Preview(_) => None,
        }
    }

    pub fn is_sealed(&self, stage: Stage) -> bool { self.get(stage).is_some() }

    /// Sealed values in flow order.
    pub fn sealed(&self) -> impl Iterator<Item = (Stage, f32)> + '_ {
        self.slots.iter().filter_map(|(s, slot)| match slot {
            Slot::Sealed(v)  => Some((*s, *v)),
            Slot::Preview(_) => None,
        })
    }

    pub fn record(&self, route: Option<RouteSummary>) -> AttributeRecord {
        AttributeRecord {
            readiness:   self.get(Stage::Readiness),
            temperature: self.get(Stage::Temperature),
            charge:      self.get(Stage::Charge),
            visibility:  self.get(Stage::Visibility),
            sun:         self.get(Stage::Sun),
            wind:        self.get(Stage::Wind),
            shade:       self.get(Stage::Shade),
            crowd:       self.get(Stage::Crowd),
            route,
        }
    }
}

/// What downstream panels read, and what gets logged at the end.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness:   Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge:      Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility:  Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun:         Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind:        Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shade:       Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crowd:       Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route:       Option<RouteSummary>,
}

impl AttributeRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_invisible_until_sealed() {
        let mut s = AttributeStore::new();
        s.commit(Stage::Readiness, 0.3).unwrap();
        assert_eq!(s.get(Stage::Readiness), None);
        s.commit(Stage::Readiness, 0.8).unwrap();
        assert_eq!(s.seal(Stage::Readiness), Some(0.8));
        assert_eq!(s.get(Stage::Readiness), Some(0.8));
    }

    #[test]
    fn sealed_value_cannot_change() {
        let mut s = AttributeStore::new();
        s.commit(Stage::Charge, 0.4).unwrap();
        s.seal(Stage::Charge);
        assert!(matches!(s.commit(Stage::Charge, 0.9), Err(CheckinError::AlreadySealed { .. })));
        assert_eq!(s.get(Stage::Charge), Some(0.4));
    }

    #[test]
    fn non_finite_rejected() {
        let mut s = AttributeStore::new();
        assert!(s.commit(Stage::Sun, f32::NAN).is_err());
        assert_eq!(s.seal(Stage::Sun), None);
    }

    #[test]
    fn record_skips_missing() {
        let mut s = AttributeStore::new();
        s.commit(Stage::Readiness, 1.0).unwrap();
        s.seal(Stage::Readiness);
        s.commit(Stage::Temperature, 0.5).unwrap();
        let json = s.record(None).to_json().unwrap();
        assert!(json.contains("\"readiness\": 1.0"));
        assert!(!json.contains("temperature"));
        assert_eq!(s.sealed().collect::<Vec<_>>(), vec![(Stage::Readiness, 1.0)]);
    }
}
