//! Core types and logic for waterlog.
//!
//! Record types, the volume calculator, error feedback, parameter
//! resolution and the watering service built on top of them.

pub mod calculator;
pub mod correction;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod resolver;

pub use calculator::VolumeBreakdown;
pub use correction::ErrorCorrection;
pub use model::{
    ClimateId, ClimateSnapshot, EventFilter, EventId, Material, MaterialId, NewClimate, NewPlant,
    PlantId, PlantProfile, PlantType, PlantTypeId, Recommendation, UserId, WateringEvent,
    WateringEventDraft, WateringPatch, WateringRequest,
};
pub use pipeline::{Explanation, WateringService};
pub use resolver::{ParameterResolver, ResolvedContext};
