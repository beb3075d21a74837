//! File-based diary storage.
//!
//! The whole diary is one JSON document, by default
//! `~/.waterlog/diary.json`. Every read-modify-write cycle holds an
//! exclusive lock on a `.lock` sibling of the document, so separate
//! processes and separate handles on the same path serialize their
//! writes. The document is replaced by persisting a uniquely named temp
//! file over it, so readers never see a partial write.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::core::model::{
    ClimateSnapshot, EventFilter, EventId, Material, MaterialId, NewClimate, NewPlant, PlantId,
    PlantProfile, PlantType, PlantTypeId, UserId, WateringEvent, WateringEventDraft,
};
use crate::error::{Result, WaterlogError};
use crate::storage::document::{DiaryDocument, DIARY_SCHEMA_VERSION};
use crate::storage::DiaryStore;

/// File-based diary storage.
#[derive(Debug)]
pub struct FileDiaryStore {
    /// Path of the JSON document.
    path: PathBuf,
}

impl FileDiaryStore {
    /// Create a store at a custom path, creating parent directories.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| WaterlogError::storage(parent, e))?;
            }
        }

        Ok(Self { path })
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the document and its lock and temp files.
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Path of the lock file guarding writes.
    fn lock_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "diary.json".to_string());
        self.path.with_file_name(format!(".{}.lock", name))
    }

    /// Take the exclusive write lock, blocking until it is free.
    ///
    /// Released when the returned file is dropped.
    fn lock(&self) -> Result<File> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| WaterlogError::storage(&lock_path, e))?;
        file.lock()
            .map_err(|e| WaterlogError::storage(&lock_path, e))?;
        Ok(file)
    }

    /// Load the document. A missing file is an empty diary.
    pub fn load(&self) -> Result<DiaryDocument> {
        if !self.path.exists() {
            return Ok(DiaryDocument::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| WaterlogError::storage(&self.path, e))?;
        let doc: DiaryDocument = serde_json::from_str(&content)?;

        if doc.schema_version > DIARY_SCHEMA_VERSION {
            tracing::warn!(
                found = doc.schema_version,
                supported = DIARY_SCHEMA_VERSION,
                path = %self.path.display(),
                "diary was written by a newer version"
            );
        }

        Ok(doc)
    }

    /// Write the document atomically through a unique temp file.
    fn atomic_write(&self, doc: &DiaryDocument) -> Result<()> {
        let dir = self.dir();
        let json = serde_json::to_string_pretty(doc)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| WaterlogError::storage(dir, e))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| WaterlogError::storage(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| WaterlogError::storage(temp.path(), e))?;

        temp.persist(&self.path)
            .map_err(|e| WaterlogError::storage(&self.path, e.error))?;

        Ok(())
    }

    /// Load, apply `f`, and persist only if `f` succeeds.
    ///
    /// The whole cycle runs under the file lock, so a check made by `f`
    /// (such as the one-event-per-day rule) sees every earlier write.
    fn modify<T>(&self, f: impl FnOnce(&mut DiaryDocument) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        self.atomic_write(&doc)?;
        Ok(out)
    }
}

impl DiaryStore for FileDiaryStore {
    fn get_plant_profile(&self, id: PlantId) -> Result<Option<PlantProfile>> {
        Ok(self.load()?.plants.remove(&id))
    }

    fn get_plant_type(&self, id: PlantTypeId) -> Result<Option<PlantType>> {
        Ok(self.load()?.plant_types.remove(&id))
    }

    fn get_material(&self, id: MaterialId) -> Result<Option<Material>> {
        Ok(self.load()?.materials.remove(&id))
    }

    fn get_latest_climate_snapshot(
        &self,
        user_id: UserId,
        as_of: NaiveDate,
    ) -> Result<Option<ClimateSnapshot>> {
        Ok(self.load()?.latest_climate(user_id, as_of).cloned())
    }

    fn get_previous_watering_event(
        &self,
        plant_id: PlantId,
        before: NaiveDate,
    ) -> Result<Option<WateringEvent>> {
        Ok(self.load()?.previous_event(plant_id, before).cloned())
    }

    fn get_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        Ok(self.load()?.events.remove(&id))
    }

    fn event_exists(&self, plant_id: PlantId, date: NaiveDate) -> Result<bool> {
        Ok(self.load()?.event_on(plant_id, date).is_some())
    }

    fn insert_watering_event(&self, draft: WateringEventDraft) -> Result<WateringEvent> {
        self.modify(|doc| doc.insert_event(draft))
    }

    fn update_watering_event(&self, event: &WateringEvent) -> Result<()> {
        self.modify(|doc| doc.update_event(event))
    }

    fn delete_watering_event(&self, id: EventId) -> Result<Option<WateringEvent>> {
        self.modify(|doc| Ok(doc.events.remove(&id)))
    }

    fn list_watering_events(&self, filter: &EventFilter) -> Result<Vec<WateringEvent>> {
        Ok(self.load()?.list_events(filter))
    }

    fn put_plant_type(&self, plant_type: &PlantType) -> Result<()> {
        self.modify(|doc| {
            doc.plant_types.insert(plant_type.id, plant_type.clone());
            Ok(())
        })
    }

    fn put_material(&self, material: &Material) -> Result<()> {
        self.modify(|doc| {
            doc.materials.insert(material.id, material.clone());
            Ok(())
        })
    }

    fn put_plant_profile(&self, profile: &PlantProfile) -> Result<()> {
        self.modify(|doc| {
            doc.plants.insert(profile.id, profile.clone());
            Ok(())
        })
    }

    fn put_climate_snapshot(&self, snapshot: &ClimateSnapshot) -> Result<()> {
        self.modify(|doc| {
            doc.climate.insert(snapshot.id, snapshot.clone());
            Ok(())
        })
    }

    fn plant_type_count(&self) -> Result<usize> {
        Ok(self.load()?.plant_types.len())
    }

    fn material_count(&self) -> Result<usize> {
        Ok(self.load()?.materials.len())
    }

    fn insert_plant_profile(&self, plant: NewPlant) -> Result<PlantProfile> {
        self.modify(|doc| Ok(doc.insert_plant(plant)))
    }

    fn insert_climate_snapshot(&self, climate: NewClimate) -> Result<ClimateSnapshot> {
        self.modify(|doc| Ok(doc.insert_climate(climate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictKind;
    use crate::storage::traits::tests::{draft, test_diary_store_contract};
    use tempfile::TempDir;

    fn create_test_store() -> (FileDiaryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileDiaryStore::with_path(dir.path().join("diary.json")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_file_store_contract() {
        let (store, _dir) = create_test_store();
        test_diary_store_contract(&store);
    }

    #[test]
    fn test_with_path_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("diary.json");

        let store = FileDiaryStore::with_path(&nested).unwrap();

        assert!(nested.parent().unwrap().is_dir());
        assert_eq!(store.path(), nested.as_path());
    }

    #[test]
    fn test_missing_file_is_empty_diary() {
        let (store, _dir) = create_test_store();
        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), DiaryDocument::new());
    }

    #[test]
    fn test_write_persists_across_instances() {
        let (store, dir) = create_test_store();
        let event = store
            .insert_watering_event(draft(1, "2026-10-01", 90))
            .unwrap();

        let reopened = FileDiaryStore::with_path(dir.path().join("diary.json")).unwrap();
        assert_eq!(reopened.get_watering_event(event.id).unwrap(), Some(event));
    }

    #[test]
    fn test_failed_write_leaves_file_untouched() {
        let (store, _dir) = create_test_store();
        store
            .insert_watering_event(draft(1, "2026-10-01", 90))
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store
            .insert_watering_event(draft(1, "2026-10-01", 50))
            .is_err());

        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (store, dir) = create_test_store();
        store
            .insert_watering_event(draft(1, "2026-10-01", 90))
            .unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".diary.json.lock", "diary.json"]);
    }

    #[test]
    fn test_lock_is_released_after_write() {
        let (store, _dir) = create_test_store();
        store
            .insert_watering_event(draft(1, "2026-10-01", 90))
            .unwrap();

        let lock = File::open(store.lock_path()).unwrap();
        assert!(lock.try_lock().is_ok());
    }

    #[test]
    fn test_concurrent_inserts_across_handles_single_winner() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.json");

        for round in 0..20 {
            let day = format!("2026-10-{:02}", round + 1);
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|i| {
                    let store = FileDiaryStore::with_path(&path).unwrap();
                    let barrier = Arc::clone(&barrier);
                    let day = day.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        store.insert_watering_event(draft(1, &day, 10 + i))
                    })
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            let winners = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(winners, 1, "round {}", round);
            for result in results.into_iter().filter_map(|r| r.err()) {
                assert!(
                    matches!(
                        result,
                        WaterlogError::Conflict {
                            kind: ConflictKind::DuplicateEvent,
                            ..
                        }
                    ),
                    "loser got {:?}",
                    result
                );
            }
        }

        let reopened = FileDiaryStore::with_path(&path).unwrap();
        assert_eq!(reopened.load().unwrap().events.len(), 20);
    }

    #[test]
    fn test_concurrent_writes_across_handles_are_not_lost() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.json");
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4u32)
            .map(|plant| {
                let store = FileDiaryStore::with_path(&path).unwrap();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for day in 1..=10u32 {
                        let day = format!("2026-10-{:02}", day);
                        store.insert_watering_event(draft(plant + 1, &day, 50)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = FileDiaryStore::with_path(&path).unwrap();
        let doc = store.load().unwrap();
        assert_eq!(doc.events.len(), 40);
        for plant in 1..=4 {
            let per_plant = doc.events.values().filter(|e| e.plant_id == PlantId(plant));
            assert_eq!(per_plant.count(), 10);
        }
    }

    #[test]
    fn test_corrupt_file_is_serde_error() {
        let (store, _dir) = create_test_store();
        fs::write(store.path(), "not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, WaterlogError::Serde { .. }));
    }
}
