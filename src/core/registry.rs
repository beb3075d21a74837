//! Registration of plants, climate readings and reference data.
//!
//! Every write validates its input first; identifiers for plants and
//! climate readings are assigned by the store.

use tracing::info;

use crate::core::model::{
    is_valid_coefficient, ClimateSnapshot, Material, NewClimate, NewPlant, PlantProfile,
    PlantType, MAX_COEFFICIENT, MIN_COEFFICIENT,
};
use crate::error::{Resource, Result, WaterlogError};
use crate::storage::DiaryStore;

/// Largest accepted pot diameter in cm.
pub const MAX_POT_SIZE_CM: u32 = 500;
/// Largest accepted plant height in cm.
pub const MAX_HEIGHT_CM: u32 = 2_000;

/// Register a plant. Its type and material must already exist.
pub fn register_plant<S: DiaryStore>(store: &S, plant: NewPlant) -> Result<PlantProfile> {
    let name = plant.name.trim().to_string();
    if name.is_empty() {
        return Err(WaterlogError::validation("plant name is required"));
    }
    check_at_most("pot size", plant.pot_size_cm, MAX_POT_SIZE_CM)?;
    check_at_most("height", plant.height_cm, MAX_HEIGHT_CM)?;
    check_at_most("soil loosener share", plant.soil_loosener_pct, 100)?;

    if store.get_plant_type(plant.plant_type_id)?.is_none() {
        return Err(WaterlogError::not_found(
            Resource::PlantType,
            plant.plant_type_id,
        ));
    }
    if store.get_material(plant.material_id)?.is_none() {
        return Err(WaterlogError::not_found(Resource::Material, plant.material_id));
    }

    let profile = store.insert_plant_profile(NewPlant { name, ..plant })?;

    info!(plant = %profile.id, user = %profile.user_id, "plant registered");
    Ok(profile)
}

/// Record a climate reading for a user.
pub fn record_climate<S: DiaryStore>(store: &S, climate: NewClimate) -> Result<ClimateSnapshot> {
    if !climate.temperature_c.is_finite() {
        return Err(WaterlogError::validation("temperature must be a number"));
    }
    if !(0.0..=100.0).contains(&climate.humidity_pct) {
        return Err(WaterlogError::validation(format!(
            "humidity must be between 0 and 100 percent, got {}",
            climate.humidity_pct
        )));
    }

    let snapshot = store.insert_climate_snapshot(climate)?;

    info!(climate = %snapshot.id, user = %snapshot.user_id, date = %snapshot.date, "climate recorded");
    Ok(snapshot)
}

/// Insert or replace a plant type.
pub fn put_plant_type<S: DiaryStore>(store: &S, plant_type: &PlantType) -> Result<()> {
    check_coefficient("plant type", plant_type.coefficient)?;
    store.put_plant_type(plant_type)
}

/// Insert or replace a pot material.
pub fn put_material<S: DiaryStore>(store: &S, material: &Material) -> Result<()> {
    check_coefficient("material", material.coefficient)?;
    store.put_material(material)
}

fn check_coefficient(what: &str, value: u8) -> Result<()> {
    if is_valid_coefficient(value) {
        Ok(())
    } else {
        Err(WaterlogError::validation(format!(
            "{} coefficient must be between {} and {}, got {}",
            what, MIN_COEFFICIENT, MAX_COEFFICIENT, value
        )))
    }
}

fn check_at_most(what: &str, value: Option<u32>, max: u32) -> Result<()> {
    match value {
        Some(v) if v > max => Err(WaterlogError::validation(format!(
            "{} must be at most {}, got {}",
            what, max, v
        ))),
        _ => Ok(()),
    }
}
