//! Parameter resolution for a plant.
//!
//! Collects everything the calculator needs: the plant profile, its type and
//! material coefficients, and the owning user's latest climate reading.
//! Read-only; any missing piece is a not-found error naming that piece.

use chrono::{Local, NaiveDate};

use crate::core::calculator::{self, VolumeBreakdown};
use crate::core::model::{ClimateSnapshot, Material, PlantId, PlantProfile, PlantType};
use crate::error::{Resource, Result, WaterlogError};
use crate::storage::DiaryStore;

/// All inputs to a volume calculation for one plant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    pub profile: PlantProfile,
    pub plant_type: PlantType,
    pub material: Material,
    pub climate: ClimateSnapshot,
}

impl ResolvedContext {
    /// Base volume of the plant's pot.
    pub fn base_volume(&self) -> u32 {
        calculator::base_volume(&self.profile)
    }

    /// Run the calculator with the given feedback term.
    pub fn breakdown(&self, feedback_ml: i32) -> VolumeBreakdown {
        calculator::breakdown(
            &self.profile,
            Some(self.plant_type.coefficient),
            Some(self.material.coefficient),
            self.climate.temperature_c,
            self.climate.humidity_pct,
            feedback_ml,
        )
    }
}

/// Resolves calculation inputs from a store.
#[derive(Debug)]
pub struct ParameterResolver<'a, S: DiaryStore> {
    store: &'a S,
}

impl<'a, S: DiaryStore> ParameterResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve using today's local date for climate selection.
    pub fn resolve(&self, plant_id: PlantId) -> Result<ResolvedContext> {
        self.resolve_at(plant_id, Local::now().date_naive())
    }

    /// Resolve with climate readings dated no later than `as_of`.
    pub fn resolve_at(&self, plant_id: PlantId, as_of: NaiveDate) -> Result<ResolvedContext> {
        let profile = self.profile(plant_id)?;

        let plant_type = self
            .store
            .get_plant_type(profile.plant_type_id)?
            .ok_or_else(|| WaterlogError::not_found(Resource::PlantType, profile.plant_type_id))?;

        let material = self
            .store
            .get_material(profile.material_id)?
            .ok_or_else(|| WaterlogError::not_found(Resource::Material, profile.material_id))?;

        let climate = self
            .store
            .get_latest_climate_snapshot(profile.user_id, as_of)?
            .ok_or_else(|| {
                WaterlogError::not_found(
                    Resource::Climate,
                    format!("user {} on or before {}", profile.user_id, as_of),
                )
            })?;

        Ok(ResolvedContext {
            profile,
            plant_type,
            material,
            climate,
        })
    }

    /// Look up only the profile.
    pub fn profile(&self, plant_id: PlantId) -> Result<PlantProfile> {
        self.store
            .get_plant_profile(plant_id)?
            .ok_or_else(|| WaterlogError::not_found(Resource::Plant, plant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ClimateId, MaterialId, PlantTypeId, UserId};
    use crate::storage::traits::tests::date;
    use crate::storage::MemoryDiaryStore;

    fn store_with(
        profile: bool,
        plant_type: bool,
        material: bool,
        climate: bool,
    ) -> MemoryDiaryStore {
        let store = MemoryDiaryStore::new();
        if profile {
            store
                .put_plant_profile(&PlantProfile::new(
                    PlantId(1),
                    "monstera",
                    UserId(7),
                    PlantTypeId(2),
                    MaterialId(3),
                ))
                .unwrap();
        }
        if plant_type {
            store
                .put_plant_type(&PlantType {
                    id: PlantTypeId(2),
                    name: "Monstera".to_string(),
                    description: String::new(),
                    coefficient: 52,
                })
                .unwrap();
        }
        if material {
            store
                .put_material(&Material {
                    id: MaterialId(3),
                    name: "Ceramic".to_string(),
                    coefficient: 30,
                })
                .unwrap();
        }
        if climate {
            store
                .put_climate_snapshot(&ClimateSnapshot {
                    id: ClimateId(1),
                    user_id: UserId(7),
                    date: date("2026-10-01"),
                    temperature_c: 23.0,
                    humidity_pct: 40.0,
                })
                .unwrap();
        }
        store
    }

    fn missing(result: Result<ResolvedContext>) -> Resource {
        match result {
            Err(WaterlogError::NotFound { resource, .. }) => resource,
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_complete() {
        let store = store_with(true, true, true, true);
        let ctx = ParameterResolver::new(&store)
            .resolve_at(PlantId(1), date("2026-10-05"))
            .unwrap();
        assert_eq!(ctx.plant_type.coefficient, 52);
        assert_eq!(ctx.material.coefficient, 30);
        assert_eq!(ctx.climate.temperature_c, 23.0);
        assert_eq!(ctx.base_volume(), 60);
    }

    #[test]
    fn test_missing_pieces_are_named() {
        let cases = [
            (store_with(false, true, true, true), Resource::Plant),
            (store_with(true, false, true, true), Resource::PlantType),
            (store_with(true, true, false, true), Resource::Material),
            (store_with(true, true, true, false), Resource::Climate),
        ];

        for (store, expected) in cases {
            let result = ParameterResolver::new(&store).resolve_at(PlantId(1), date("2026-10-05"));
            assert_eq!(missing(result), expected);
        }
    }

    #[test]
    fn test_future_climate_is_ignored() {
        let store = store_with(true, true, true, true);
        let result = ParameterResolver::new(&store).resolve_at(PlantId(1), date("2026-09-30"));
        assert_eq!(missing(result), Resource::Climate);
    }

    #[test]
    fn test_breakdown_uses_resolved_values() {
        let store = store_with(true, true, true, true);
        let ctx = ParameterResolver::new(&store)
            .resolve_at(PlantId(1), date("2026-10-05"))
            .unwrap();
        let b = ctx.breakdown(0);
        assert!((b.type_factor - 1.02).abs() < 1e-9);
        assert!((b.material_factor - 1.0).abs() < 1e-9);
        assert!((b.temperature_factor - 1.03).abs() < 1e-9);
    }
}
