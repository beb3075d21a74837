//! Record types for the watering diary.
//!
//! Entities reference each other by identifier only. A plant profile knows
//! the ids of its type, material and owner; the store resolves them on
//! demand.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifier of a user owning plants and climate readings.
    UserId
);
id_type!(
    /// Identifier of a plant profile.
    PlantId
);
id_type!(
    /// Identifier of a plant type (species) record.
    PlantTypeId
);
id_type!(
    /// Identifier of a pot material record.
    MaterialId
);
id_type!(
    /// Identifier of a climate snapshot.
    ClimateId
);
id_type!(
    /// Identifier of a watering event.
    EventId
);

/// Lowest accepted type or material coefficient.
pub const MIN_COEFFICIENT: u8 = 1;
/// Highest accepted type or material coefficient.
pub const MAX_COEFFICIENT: u8 = 100;

/// Whether a coefficient lies in the accepted `[1, 100]` range.
pub fn is_valid_coefficient(value: u8) -> bool {
    (MIN_COEFFICIENT..=MAX_COEFFICIENT).contains(&value)
}

/// A species with its relative thirstiness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantType {
    pub id: PlantTypeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Deviation from the baseline watering need, 1..=100. Higher is thirstier.
    pub coefficient: u8,
}

/// A pot material with its evaporation rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Evaporation rate, 1..=100. Higher dries out faster.
    pub coefficient: u8,
}

/// A user's plant and the physical attributes that drive watering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantProfile {
    pub id: PlantId,
    pub name: String,
    pub user_id: UserId,
    pub plant_type_id: PlantTypeId,
    pub material_id: MaterialId,
    /// Plant height in cm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<u32>,
    /// Pot diameter in cm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pot_size_cm: Option<u32>,
    /// Share of soil looseners (perlite, vermiculite) in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_loosener_pct: Option<u32>,
}

impl PlantProfile {
    /// Create a profile with no optional attributes set.
    pub fn new(
        id: PlantId,
        name: impl Into<String>,
        user_id: UserId,
        plant_type_id: PlantTypeId,
        material_id: MaterialId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            user_id,
            plant_type_id,
            material_id,
            height_cm: None,
            pot_size_cm: None,
            soil_loosener_pct: None,
        }
    }
}

/// One climate reading for a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateSnapshot {
    pub id: ClimateId,
    pub user_id: UserId,
    pub date: NaiveDate,
    /// Air temperature in °C.
    pub temperature_c: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
}

/// A recorded watering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WateringEvent {
    pub id: EventId,
    pub plant_id: PlantId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub applied_volume_ml: u32,
    /// Recommended minus applied volume in mL. Positive means the plant
    /// got less than recommended.
    pub error_ml: i32,
}

/// A watering event that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct WateringEventDraft {
    pub plant_id: PlantId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub applied_volume_ml: u32,
    pub error_ml: i32,
}

impl WateringEventDraft {
    /// Attach an id, producing the stored event.
    pub fn with_id(self, id: EventId) -> WateringEvent {
        WateringEvent {
            id,
            plant_id: self.plant_id,
            date: self.date,
            time: self.time,
            applied_volume_ml: self.applied_volume_ml,
            error_ml: self.error_ml,
        }
    }
}

/// A plant that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub user_id: UserId,
    pub plant_type_id: PlantTypeId,
    pub material_id: MaterialId,
    #[serde(default)]
    pub height_cm: Option<u32>,
    #[serde(default)]
    pub pot_size_cm: Option<u32>,
    #[serde(default)]
    pub soil_loosener_pct: Option<u32>,
}

impl NewPlant {
    /// Attach an id, producing the stored profile.
    pub fn with_id(self, id: PlantId) -> PlantProfile {
        PlantProfile {
            id,
            name: self.name,
            user_id: self.user_id,
            plant_type_id: self.plant_type_id,
            material_id: self.material_id,
            height_cm: self.height_cm,
            pot_size_cm: self.pot_size_cm,
            soil_loosener_pct: self.soil_loosener_pct,
        }
    }
}

/// A climate reading that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewClimate {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

impl NewClimate {
    /// Attach an id, producing the stored snapshot.
    pub fn with_id(self, id: ClimateId) -> ClimateSnapshot {
        ClimateSnapshot {
            id,
            user_id: self.user_id,
            date: self.date,
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
        }
    }
}

/// Caller input for recording a watering. Fields are optional so that a
/// missing value is reported as a validation failure, not a parse panic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WateringRequest {
    pub plant_id: Option<PlantId>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub applied_volume_ml: Option<i64>,
}

impl WateringRequest {
    /// Build a complete request.
    pub fn new(plant_id: PlantId, date: NaiveDate, time: NaiveTime, applied_volume_ml: i64) -> Self {
        Self {
            plant_id: Some(plant_id),
            date: Some(date),
            time: Some(time),
            applied_volume_ml: Some(applied_volume_ml),
        }
    }
}

/// Partial update of a watering event. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WateringPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub applied_volume_ml: Option<i64>,
}

impl WateringPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.applied_volume_ml.is_none()
    }
}

/// Filter for listing watering history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Only events of plants owned by this user.
    pub user_id: Option<UserId>,
    /// Only events of this plant.
    pub plant_id: Option<PlantId>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
}

impl EventFilter {
    /// Whether an event's own fields pass the plant and date bounds.
    ///
    /// Ownership (`user_id`) needs the plant profile and is checked by the
    /// store.
    pub fn matches_event(&self, event: &WateringEvent) -> bool {
        if let Some(plant_id) = self.plant_id {
            if event.plant_id != plant_id {
                return false;
            }
        }
        if let Some(from) = self.from {
            if event.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if event.date > to {
                return false;
            }
        }
        true
    }
}

/// Unit label attached to every recommendation.
pub const VOLUME_UNIT: &str = "mL";

/// A volume recommendation for one plant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub plant_id: PlantId,
    pub recommended_volume_ml: u32,
    pub unit: String,
}

impl Recommendation {
    /// Create a recommendation in millilitres.
    pub fn new(plant_id: PlantId, recommended_volume_ml: u32) -> Self {
        Self {
            plant_id,
            recommended_volume_ml,
            unit: VOLUME_UNIT.to_string(),
        }
    }
}
