//! Storage trait for the watering diary.
//!
//! The engine never holds live references between records. It reads
//! reference data by identifier and writes watering events through this
//! trait.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::model::{
    ClimateSnapshot, EventFilter, EventId, Material, MaterialId, NewClimate, NewPlant, PlantId,
    PlantProfile, PlantType, PlantTypeId, UserId, WateringEvent, WateringEventDraft,
};
use crate::error::Result;

/// Trait for diary storage backends.
///
/// Lookups return `Ok(None)` when the record does not exist; `Err` is
/// reserved for storage failures. Implementations must enforce the
/// one-event-per-(plant, date) invariant in
/// [`insert_watering_event`](DiaryStore::insert_watering_event) and
/// [`update_watering_event`](DiaryStore::update_watering_event), failing
/// with a duplicate-event conflict.
pub trait DiaryStore: Send + Sync {
    /// Retrieve a plant profile by ID.
    fn get_plant_profile(&self, id: PlantId) -> Result<Option<PlantProfile>>;

    /// Retrieve a plant type by ID.
    fn get_plant_type(&self, id: PlantTypeId) -> Result<Option<PlantType>>;

    /// Retrieve a pot material by ID.
    fn get_material(&self, id: MaterialId) -> Result<Option<Material>>;

    /// The user's snapshot with the greatest date not after `as_of`.
    ///
    /// When several snapshots share that date, the one with the highest
    /// ID wins.
    fn get_latest_climate_snapshot(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<Option<ClimateSnapshot>>;

    /// The plant's most recent event dated strictly before `before`.
    fn get_previous_watering_event(
        &self,
        plant_id: PlantId,
        before: NaiveDate,
    ) -> Result<Option<WateringEvent>>;

    /// Retrieve a watering event by ID.
    fn get_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>>;

    /// Check whether the plant already has an event on `date`.
    fn event_exists(&self, plant_id: PlantId, date: NaiveDate) -> Result<bool>;

    /// Store a new event and assign its ID.
    fn insert_watering_event(&self, draft: WateringEventDraft) -> Result<WateringEvent>;

    /// Replace a stored event.
    ///
    /// Fails with not-found if no event has this ID.
    fn update_watering_event(&self, event: &WateringEvent) -> Result<()>;

    /// Delete an event, returning it if it existed.
    fn delete_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>>;

    /// List events matching the filter, oldest first.
    fn list_watering_events(&self, filter: &EventFilter) -> Result<Vec<WateringEvent>>;

    /// Create or replace a plant type.
    fn put_plant_type(&self, plant_type: &PlantType) -> Result<()>;

    /// Create or replace a material.
    fn put_material(&self, material: &Material) -> Result<()>;

    /// Create or replace a plant profile.
    fn put_plant_profile(&self, profile: &PlantProfile) -> Result<()>;

    /// Create or replace a climate snapshot.
    fn put_climate_snapshot(&self, snapshot: &ClimateSnapshot) -> Result<()>;

    /// Store a new plant and assign its ID.
    ///
    /// Allocation and write happen under one write lock, so concurrent
    /// registrations never share an ID.
    fn insert_plant_profile(&self, plant: NewPlant) -> Result<PlantProfile>;

    /// Store a new climate reading and assign its ID.
    fn insert_climate_snapshot(&self, climate: NewClimate) -> Result<ClimateSnapshot>;

    /// The plant's most recent event overall.
    fn get_last_watering_event(&self, plant_id: PlantId) -> Result<Option<WateringEvent>> {
        self.get_previous_watering_event(plant_id, NaiveDate::MAX)
    }

    /// Count of plant types, used to decide whether to seed the catalog.
    fn plant_type_count(&self) -> Result<usize>;

    /// Count of materials, used to decide whether to seed the catalog.
    fn material_count(&self) -> Result<usize>;
}

/// Blanket implementation of DiaryStore for Arc-wrapped stores.
///
/// This allows sharing one store between a service and the test that
/// inspects it.
impl<T: DiaryStore + ?Sized> DiaryStore for Arc<T> {
    fn get_plant_profile(&self, id: PlantId) -> Result<Option<PlantProfile>> {
        (**self).get_plant_profile(id)
    }

    fn get_plant_type(&self, id: PlantTypeId) -> Result<Option<PlantType>> {
        (**self).get_plant_type(id)
    }

    fn get_material(&self, id: MaterialId) -> Result<Option<Material>> {
        (**self).get_material(id)
    }

    fn get_latest_climate_snapshot(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<Option<ClimateSnapshot>> {
        (**self).get_latest_climate_snapshot(user_id, as_of)
    }

    fn get_previous_watering_event(
        &self,
        plant_id: PlantId,
        before: NaiveDate,
    ) -> Result<Option<WateringEvent>> {
        (**self).get_previous_watering_event(plant_id, before)
    }

    fn get_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        (**self).get_watering_event(id)
    }

    fn event_exists(&self, plant_id: PlantId, date: NaiveDate) -> Result<bool> {
        (**self).event_exists(plant_id, date)
    }

    fn insert_watering_event(&self, draft: WateringEventDraft) -> Result<WateringEvent> {
        (**self).insert_watering_event(draft)
    }

    fn update_watering_event(&self, event: &WateringEvent) -> Result<()> {
        (**self).update_watering_event(event)
    }

    fn delete_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        (**self).delete_watering_event(id)
    }

    fn list_watering_events(&self, filter: &EventFilter) -> Result<Vec<WateringEvent>> {
        (**self).list_watering_events(filter)
    }

    fn put_plant_type(&self, plant_type: &PlantType) -> Result<()> {
        (**self).put_plant_type(plant_type)
    }

    fn put_material(&self, material: &Material) -> Result<()> {
        (**self).put_material(material)
    }

    fn put_plant_profile(&self, profile: &PlantProfile) -> Result<()> {
        (**self).put_plant_profile(profile)
    }

    fn put_climate_snapshot(&self, snapshot: &ClimateSnapshot) -> Result<()> {
        (**self).put_climate_snapshot(snapshot)
    }

    fn insert_plant_profile(&self, plant: NewPlant) -> Result<PlantProfile> {
        (**self).insert_plant_profile(plant)
    }

    fn insert_climate_snapshot(&self, climate: NewClimate) -> Result<ClimateSnapshot> {
        (**self).insert_climate_snapshot(climate)
    }

    fn plant_type_count(&self) -> Result<usize> {
        (**self).plant_type_count()
    }

    fn material_count(&self) -> Result<usize> {
        (**self).material_count()
    }
}

/// Test utilities for DiaryStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::core::model::ClimateId;
    use crate::error::{ConflictKind, WaterlogError};
    use chrono::NaiveTime;

    pub fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    pub fn draft(plant: u32, day: &str, volume: u32) -> WateringEventDraft {
        WateringEventDraft {
            plant_id: PlantId(plant),
            date: date(day),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            applied_volume_ml: volume,
            error_ml: 0,
        }
    }

    /// Test helper to verify DiaryStore implementations.
    pub fn test_diary_store_contract<S: DiaryStore>(store: &S) {
        // Reference data
        store
            .put_plant_type(&PlantType {
                id: PlantTypeId(1),
                name: "Fern".to_string(),
                description: String::new(),
                coefficient: 80,
            })
            .unwrap();
        store
            .put_material(&Material {
                id: MaterialId(1),
                name: "Plastic".to_string(),
                coefficient: 70,
            })
            .unwrap();
        let profile = PlantProfile::new(PlantId(1), "fern", UserId(1), PlantTypeId(1), MaterialId(1));
        store.put_plant_profile(&profile).unwrap();

        assert_eq!(store.get_plant_type(PlantTypeId(1)).unwrap().unwrap().coefficient, 80);
        assert!(store.get_plant_type(PlantTypeId(2)).unwrap().is_none());
        assert_eq!(store.get_material(MaterialId(1)).unwrap().unwrap().coefficient, 70);
        assert_eq!(store.get_plant_profile(PlantId(1)).unwrap().unwrap(), profile);
        assert!(store.get_plant_profile(PlantId(9)).unwrap().is_none());
        assert_eq!(store.plant_type_count().unwrap(), 1);
        assert_eq!(store.material_count().unwrap(), 1);

        // Registration assigns the next free IDs
        let added = store
            .insert_plant_profile(NewPlant {
                name: "second fern".to_string(),
                user_id: UserId(2),
                plant_type_id: PlantTypeId(1),
                material_id: MaterialId(1),
                height_cm: Some(25),
                pot_size_cm: None,
                soil_loosener_pct: None,
            })
            .unwrap();
        assert_eq!(added.id, PlantId(2));
        assert_eq!(store.get_plant_profile(PlantId(2)).unwrap(), Some(added));

        // Climate: latest on or before the reference date
        for (id, day, temp) in [(1, "2026-10-01", 18.0), (2, "2026-10-05", 22.0), (3, "2026-10-20", 30.0)] {
            store
                .put_climate_snapshot(&ClimateSnapshot {
                    id: ClimateId(id),
                    user_id: UserId(1),
                    date: date(day),
                    temperature_c: temp,
                    humidity_pct: 50.0,
                })
                .unwrap();
        }
        let latest = store
            .get_latest_climate_snapshot(UserId(1), date("2026-10-10"))
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, ClimateId(2));
        let on_day = store
            .get_latest_climate_snapshot(UserId(1), date("2026-10-20"))
            .unwrap()
            .unwrap();
        assert_eq!(on_day.id, ClimateId(3));
        assert!(store
            .get_latest_climate_snapshot(UserId(1), date("2026-09-30"))
            .unwrap()
            .is_none());
        assert!(store
            .get_latest_climate_snapshot(UserId(2), date("2026-10-10"))
            .unwrap()
            .is_none());
        let reading = store
            .insert_climate_snapshot(NewClimate {
                user_id: UserId(2),
                date: date("2026-10-01"),
                temperature_c: 19.0,
                humidity_pct: 55.0,
            })
            .unwrap();
        assert_eq!(reading.id, ClimateId(4));
        assert_eq!(
            store
                .get_latest_climate_snapshot(UserId(2), date("2026-10-10"))
                .unwrap(),
            Some(reading)
        );

        // Events
        assert!(!store.event_exists(PlantId(1), date("2026-10-02")).unwrap());
        let first = store.insert_watering_event(draft(1, "2026-10-02", 100)).unwrap();
        let second = store.insert_watering_event(draft(1, "2026-10-06", 120)).unwrap();
        assert_ne!(first.id, second.id);
        assert!(store.event_exists(PlantId(1), date("2026-10-02")).unwrap());
        assert_eq!(store.get_watering_event(first.id).unwrap().unwrap(), first);

        // Uniqueness on (plant, date)
        let dup = store.insert_watering_event(draft(1, "2026-10-02", 50));
        assert!(matches!(
            dup,
            Err(WaterlogError::Conflict {
                kind: ConflictKind::DuplicateEvent,
                ..
            })
        ));
        // Other plants may share the date
        store.insert_watering_event(draft(2, "2026-10-02", 50)).unwrap();

        // Previous is strictly before
        let prev = store
            .get_previous_watering_event(PlantId(1), date("2026-10-06"))
            .unwrap()
            .unwrap();
        assert_eq!(prev.id, first.id);
        assert!(store
            .get_previous_watering_event(PlantId(1), date("2026-10-02"))
            .unwrap()
            .is_none());
        assert_eq!(
            store.get_last_watering_event(PlantId(1)).unwrap().unwrap().id,
            second.id
        );

        // Update
        let mut moved = second.clone();
        moved.error_ml = -7;
        store.update_watering_event(&moved).unwrap();
        assert_eq!(store.get_watering_event(second.id).unwrap().unwrap().error_ml, -7);
        moved.date = date("2026-10-02");
        assert!(store.update_watering_event(&moved).is_err());

        // Listing
        let all = store
            .list_watering_events(&EventFilter {
                plant_id: Some(PlantId(1)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].date < all[1].date);
        let owned = store
            .list_watering_events(&EventFilter {
                user_id: Some(UserId(1)),
                ..Default::default()
            })
            .unwrap();
        // Plant 2 belongs to user 2
        assert_eq!(owned.len(), 2);

        // Delete
        let removed = store.delete_watering_event(first.id).unwrap();
        assert_eq!(removed.map(|e| e.id), Some(first.id));
        assert!(store.get_watering_event(first.id).unwrap().is_none());
        assert!(store.delete_watering_event(first.id).unwrap().is_none());
    }
}
