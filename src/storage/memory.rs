//! In-memory diary storage.
//!
//! Thread-safe implementation of [`DiaryStore`] for tests and for embedding
//! the engine in a host that owns persistence itself.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::core::model::{
    ClimateSnapshot, EventFilter, EventId, Material, MaterialId, NewClimate, NewPlant, PlantId,
    PlantProfile, PlantType, PlantTypeId, UserId, WateringEvent, WateringEventDraft,
};
use crate::error::Result;
use crate::storage::document::DiaryDocument;
use crate::storage::DiaryStore;

/// In-memory diary store.
///
/// Writes take the lock exclusively, so the (plant, date) check and the
/// insert are atomic: of two concurrent inserts for the same day exactly
/// one succeeds.
#[derive(Debug, Default)]
pub struct MemoryDiaryStore {
    doc: RwLock<DiaryDocument>,
}

impl MemoryDiaryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            doc: RwLock::new(DiaryDocument::new()),
        }
    }

    /// Create a store preloaded with a document.
    pub fn from_document(doc: DiaryDocument) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> DiaryDocument {
        self.read().clone()
    }

    /// Number of stored watering events.
    pub fn event_count(&self) -> usize {
        self.read().events.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, DiaryDocument> {
        self.doc.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DiaryDocument> {
        self.doc.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiaryStore for MemoryDiaryStore {
    fn get_plant_profile(&self, id: PlantId) -> Result<Option<PlantProfile>> {
        Ok(self.read().plants.get(&id).cloned())
    }

    fn get_plant_type(&self, id: PlantTypeId) -> Result<Option<PlantType>> {
        Ok(self.read().plant_types.get(&id).cloned())
    }

    fn get_material(&self, id: MaterialId) -> Result<Option<Material>> {
        Ok(self.read().materials.get(&id).cloned())
    }

    fn get_latest_climate_snapshot(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<Option<ClimateSnapshot>> {
        Ok(self.read().latest_climate(user_id, as_of).cloned())
    }

    fn get_previous_watering_event(
        &self,
        plant_id: PlantId,
        before: NaiveDate,
    ) -> Result<Option<WateringEvent>> {
        Ok(self.read().previous_event(plant_id, before).cloned())
    }

    fn get_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        Ok(self.read().events.get(&id).cloned())
    }

    fn event_exists(&self, plant_id: PlantId, date: NaiveDate) -> Result<bool> {
        Ok(self.read().event_on(plant_id, date).is_some())
    }

    fn insert_watering_event(&self, draft: WateringEventDraft) -> Result<WateringEvent> {
        self.write().insert_event(draft)
    }

    fn update_watering_event(&self, event: &WateringEvent) -> Result<()> {
        self.write().update_event(event)
    }

    fn delete_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        Ok(self.write().events.remove(&id))
    }

    fn list_watering_events(&self, filter: &EventFilter) -> Result<Vec<WateringEvent>> {
        Ok(self.read().list_events(filter))
    }

    fn put_plant_type(&self, plant_type: &PlantType) -> Result<()> {
        self.write()
            .plant_types
            .insert(plant_type.id, plant_type.clone());
        Ok(())
    }

    fn put_material(&self, material: &Material) -> Result<()> {
        self.write().materials.insert(material.id, material.clone());
        Ok(())
    }

    fn put_plant_profile(&self, profile: &PlantProfile) -> Result<()> {
        self.write().plants.insert(profile.id, profile.clone());
        Ok(())
    }

    fn put_climate_snapshot(&self, snapshot: &ClimateSnapshot) -> Result<()> {
        self.write().climate.insert(snapshot.id, snapshot.clone());
        Ok(())
    }

    fn plant_type_count(&self) -> Result<usize> {
        Ok(self.read().plant_types.len())
    }

    fn material_count(&self) -> Result<usize> {
        Ok(self.read().materials.len())
    }

    fn insert_plant_profile(&self, plant: NewPlant) -> Result<PlantProfile> {
        Ok(self.write().insert_plant(plant))
    }

    fn insert_climate_snapshot(&self, climate: NewClimate) -> Result<ClimateSnapshot> {
        Ok(self.write().insert_climate(climate))
    }
}
