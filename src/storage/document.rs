//! The diary as one serializable document.
//!
//! Both stores keep their data in a [`DiaryDocument`]: the memory store
//! behind a lock, the file store as JSON on disk. All query and invariant
//! logic lives here so the two behave identically.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::model::{
    ClimateId, ClimateSnapshot, EventFilter, EventId, Material, MaterialId, NewClimate, NewPlant,
    PlantId, PlantProfile, PlantType, PlantTypeId, UserId, WateringEvent, WateringEventDraft,
};
use crate::error::{Resource, Result, WaterlogError};

/// Current document schema version.
pub const DIARY_SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    DIARY_SCHEMA_VERSION
}

/// All diary records, keyed by ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryDocument {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub plant_types: BTreeMap<PlantTypeId, PlantType>,
    #[serde(default)]
    pub materials: BTreeMap<MaterialId, Material>,
    #[serde(default)]
    pub plants: BTreeMap<PlantId, PlantProfile>,
    #[serde(default)]
    pub climate: BTreeMap<ClimateId, ClimateSnapshot>,
    #[serde(default)]
    pub events: BTreeMap<EventId, WateringEvent>,
}

impl Default for DiaryDocument {
    fn default() -> Self {
        Self {
            schema_version: DIARY_SCHEMA_VERSION,
            plant_types: BTreeMap::new(),
            materials: BTreeMap::new(),
            plants: BTreeMap::new(),
            climate: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }
}

impl DiaryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_climate(&self, user_id: UserId, as_of: NaiveDate) -> Option<&ClimateSnapshot> {
        self.climate
            .values()
            .filter(|c| c.user_id == user_id && c.date <= as_of)
            .max_by_key(|c| (c.date, c.id))
    }

    pub fn previous_event(&self, plant_id: PlantId, before: NaiveDate) -> Option<&WateringEvent> {
        self.events
            .values()
            .filter(|e| e.plant_id == plant_id && e.date < before)
            .max_by_key(|e| e.date)
    }

    /// ID of the event on `date` for the plant, if any.
    pub fn event_on(&self, plant_id: PlantId, date: NaiveDate) -> Option<EventId> {
        self.events
            .values()
            .find(|e| e.plant_id == plant_id && e.date == date)
            .map(|e| e.id)
    }

    fn duplicate_error(plant_id: PlantId, date: NaiveDate) -> WaterlogError {
        WaterlogError::duplicate(format!(
            "plant {} already has a watering event on {}",
            plant_id, date
        ))
    }

    /// Insert under the (plant, date) uniqueness invariant.
    pub fn insert_event(&mut self, draft: WateringEventDraft) -> Result<WateringEvent> {
        if self.event_on(draft.plant_id, draft.date).is_some() {
            return Err(Self::duplicate_error(draft.plant_id, draft.date));
        }
        let id = self
            .events
            .keys()
            .next_back()
            .map(|last| EventId(last.0 + 1))
            .unwrap_or(EventId(1));
        let event = draft.with_id(id);
        self.events.insert(id, event.clone());
        Ok(event)
    }

    /// Replace an existing event under the uniqueness invariant.
    pub fn update_event(&mut self, event: &WateringEvent) -> Result<()> {
        if !self.events.contains_key(&event.id) {
            return Err(WaterlogError::not_found(Resource::WateringEvent, event.id));
        }
        match self.event_on(event.plant_id, event.date) {
            Some(other) if other != event.id => {
                Err(Self::duplicate_error(event.plant_id, event.date))
            }
            _ => {
                self.events.insert(event.id, event.clone());
                Ok(())
            }
        }
    }

    /// Events passing the filter, ordered by date then time.
    pub fn list_events(&self, filter: &EventFilter) -> Vec<WateringEvent> {
        let mut events: Vec<WateringEvent> = self
            .events
            .values()
            .filter(|e| filter.matches_event(e))
            .filter(|e| match filter.user_id {
                Some(user_id) => self
                    .plants
                    .get(&e.plant_id)
                    .is_some_and(|p| p.user_id == user_id),
                None => true,
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)));
        events
    }

    /// Store a new plant under the next free ID.
    pub fn insert_plant(&mut self, plant: NewPlant) -> PlantProfile {
        let id = self
            .plants
            .keys()
            .next_back()
            .map(|last| PlantId(last.0 + 1))
            .unwrap_or(PlantId(1));
        let profile = plant.with_id(id);
        self.plants.insert(id, profile.clone());
        profile
    }

    /// Store a new climate reading under the next free ID.
    pub fn insert_climate(&mut self, climate: NewClimate) -> ClimateSnapshot {
        let id = self
            .climate
            .keys()
            .next_back()
            .map(|last| ClimateId(last.0 + 1))
            .unwrap_or(ClimateId(1));
        let snapshot = climate.with_id(id);
        self.climate.insert(id, snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::{date, draft};

    fn snapshot(id: u32, user: u32, day: &str) -> ClimateSnapshot {
        ClimateSnapshot {
            id: ClimateId(id),
            user_id: UserId(user),
            date: date(day),
            temperature_c: 21.0,
            humidity_pct: 45.0,
        }
    }

    #[test]
    fn test_latest_climate_tie_prefers_highest_id() {
        let mut doc = DiaryDocument::new();
        doc.climate.insert(ClimateId(4), snapshot(4, 1, "2026-10-05"));
        doc.climate.insert(ClimateId(9), snapshot(9, 1, "2026-10-05"));
        let latest = doc.latest_climate(UserId(1), date("2026-10-05")).unwrap();
        assert_eq!(latest.id, ClimateId(9));
    }

    #[test]
    fn test_event_ids_increase() {
        let mut doc = DiaryDocument::new();
        let a = doc.insert_event(draft(1, "2026-10-01", 10)).unwrap();
        let b = doc.insert_event(draft(1, "2026-10-02", 10)).unwrap();
        assert_eq!(a.id, EventId(1));
        assert_eq!(b.id, EventId(2));
    }

    #[test]
    fn test_plant_ids_follow_highest_existing() {
        let mut doc = DiaryDocument::new();
        let seeded = PlantProfile::new(PlantId(7), "ivy", UserId(1), PlantTypeId(1), MaterialId(1));
        doc.plants.insert(seeded.id, seeded);
        let plant = NewPlant {
            name: "mint".to_string(),
            user_id: UserId(1),
            plant_type_id: PlantTypeId(1),
            material_id: MaterialId(1),
            height_cm: None,
            pot_size_cm: Some(12),
            soil_loosener_pct: None,
        };
        let added = doc.insert_plant(plant);
        assert_eq!(added.id, PlantId(8));
        assert_eq!(added.pot_size_cm, Some(12));
        assert_eq!(doc.plants[&PlantId(8)], added);
    }

    #[test]
    fn test_update_missing_event_is_not_found() {
        let mut doc = DiaryDocument::new();
        let event = draft(1, "2026-10-01", 10).with_id(EventId(5));
        let err = doc.update_event(&event).unwrap_err();
        assert!(matches!(
            err,
            WaterlogError::NotFound {
                resource: Resource::WateringEvent,
                ..
            }
        ));
    }

    #[test]
    fn test_update_keeping_own_date_is_allowed() {
        let mut doc = DiaryDocument::new();
        let mut event = doc.insert_event(draft(1, "2026-10-01", 10)).unwrap();
        event.applied_volume_ml = 30;
        doc.update_event(&event).unwrap();
        assert_eq!(doc.events[&event.id].applied_volume_ml, 30);
    }

    #[test]
    fn test_json_round_trip_keeps_keys() {
        let mut doc = DiaryDocument::new();
        doc.climate.insert(ClimateId(3), snapshot(3, 1, "2026-10-05"));
        doc.insert_event(draft(1, "2026-10-01", 10)).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let back: DiaryDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_sections_default() {
        let doc: DiaryDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.schema_version, DIARY_SCHEMA_VERSION);
        assert!(doc.events.is_empty());
    }
}
