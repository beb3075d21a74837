//! Watering volume calculation.
//!
//! Every physical attribute contributes a multiplicative factor centred near
//! 1.0, so a plant with no distinguishing data gets roughly the base volume.
//! Temperature and humidity factors have a floor of 0.5. The feedback term
//! is added after all factors, correcting absolute volume.
//!
//! ```text
//! base      = pot_size * 4
//! height    = 1.0 + height / 200
//! type      = 0.5 + type_coefficient / 100
//! material  = 0.7 + material_coefficient / 100
//! soil      = 1.0 + soil_loosener / 300
//! temp      = max(0.5, 1.0 + (temperature - 20) / 100)
//! humidity  = max(0.5, 1.0 + (50 - humidity) / 150)
//! volume    = max(0, round(base * height * type * material * soil * temp * humidity + feedback))
//! ```

use serde::Serialize;

use crate::core::model::PlantProfile;

/// Values used when a profile attribute or coefficient is unset.
pub mod defaults {
    /// Plant height in cm.
    pub const HEIGHT_CM: u32 = 30;
    /// Pot diameter in cm.
    pub const POT_SIZE_CM: u32 = 15;
    /// Soil loosener share in percent.
    pub const SOIL_LOOSENER_PCT: u32 = 10;
    /// Plant type coefficient.
    pub const TYPE_COEFFICIENT: u8 = 50;
    /// Material coefficient.
    pub const MATERIAL_COEFFICIENT: u8 = 50;
}

/// Lowest value the climate factors can take.
pub const CLIMATE_FACTOR_FLOOR: f64 = 0.5;

/// mL of base volume per cm of pot diameter.
const ML_PER_POT_CM: u32 = 4;

/// Every intermediate value of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBreakdown {
    pub base_volume_ml: u32,
    pub height_factor: f64,
    pub type_factor: f64,
    pub material_factor: f64,
    pub soil_factor: f64,
    pub temperature_factor: f64,
    pub humidity_factor: f64,
    pub feedback_ml: i32,
    pub volume_ml: u32,
}

/// Base volume for a profile: pot diameter times four.
pub fn base_volume(profile: &PlantProfile) -> u32 {
    profile
        .pot_size_cm
        .unwrap_or(defaults::POT_SIZE_CM)
        .saturating_mul(ML_PER_POT_CM)
}

/// Compute every factor and the resulting volume.
///
/// `type_coefficient` and `material_coefficient` fall back to 50 when
/// `None`.
pub fn breakdown(
    profile: &PlantProfile,
    type_coefficient: Option<u8>,
    material_coefficient: Option<u8>,
    temperature_c: f64,
    humidity_pct: f64,
    feedback_ml: i32,
) -> VolumeBreakdown {
    let height = profile.height_cm.unwrap_or(defaults::HEIGHT_CM) as f64;
    let loosener = profile
        .soil_loosener_pct
        .unwrap_or(defaults::SOIL_LOOSENER_PCT) as f64;
    let type_coefficient = type_coefficient.unwrap_or(defaults::TYPE_COEFFICIENT) as f64;
    let material_coefficient =
        material_coefficient.unwrap_or(defaults::MATERIAL_COEFFICIENT) as f64;

    let base_volume_ml = base_volume(profile);
    let height_factor = 1.0 + height / 200.0;
    let type_factor = 0.5 + type_coefficient / 100.0;
    let material_factor = 0.7 + material_coefficient / 100.0;
    let soil_factor = 1.0 + loosener / 300.0;
    let temperature_factor = CLIMATE_FACTOR_FLOOR.max(1.0 + (temperature_c - 20.0) / 100.0);
    let humidity_factor = CLIMATE_FACTOR_FLOOR.max(1.0 + (50.0 - humidity_pct) / 150.0);

    let raw = base_volume_ml as f64
        * height_factor
        * type_factor
        * material_factor
        * soil_factor
        * temperature_factor
        * humidity_factor
        + feedback_ml as f64;

    VolumeBreakdown {
        base_volume_ml,
        height_factor,
        type_factor,
        material_factor,
        soil_factor,
        temperature_factor,
        humidity_factor,
        feedback_ml,
        volume_ml: clamp_volume(raw),
    }
}

/// Recommended watering volume in mL. Never negative.
pub fn calculate(
    profile: &PlantProfile,
    type_coefficient: Option<u8>,
    material_coefficient: Option<u8>,
    temperature_c: f64,
    humidity_pct: f64,
    feedback_ml: i32,
) -> u32 {
    breakdown(
        profile,
        type_coefficient,
        material_coefficient,
        temperature_c,
        humidity_pct,
        feedback_ml,
    )
    .volume_ml
}

/// Round half away from zero and clamp into `0..=u32::MAX`.
fn clamp_volume(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{MaterialId, PlantId, PlantTypeId, UserId};

    fn profile(height: Option<u32>, pot: Option<u32>, loosener: Option<u32>) -> PlantProfile {
        PlantProfile {
            height_cm: height,
            pot_size_cm: pot,
            soil_loosener_pct: loosener,
            ..PlantProfile::new(PlantId(1), "p", UserId(1), PlantTypeId(1), MaterialId(1))
        }
    }

    #[test]
    fn test_reference_scenario() {
        // 60 * 1.15 * 1.0 * 1.2 * (1 + 10/300) * 1.0 * 1.0 = 85.56
        let p = profile(Some(30), Some(15), Some(10));
        let b = breakdown(&p, Some(50), Some(50), 20.0, 50.0, 0);
        assert_eq!(b.base_volume_ml, 60);
        assert!((b.height_factor - 1.15).abs() < 1e-9);
        assert!((b.type_factor - 1.0).abs() < 1e-9);
        assert!((b.material_factor - 1.2).abs() < 1e-9);
        assert!((b.temperature_factor - 1.0).abs() < 1e-9);
        assert!((b.humidity_factor - 1.0).abs() < 1e-9);
        assert_eq!(b.volume_ml, 86);
    }

    #[test]
    fn test_unset_attributes_use_defaults() {
        let explicit = profile(Some(30), Some(15), Some(10));
        let unset = profile(None, None, None);
        assert_eq!(
            calculate(&explicit, Some(50), Some(50), 20.0, 50.0, 0),
            calculate(&unset, None, None, 20.0, 50.0, 0)
        );
    }

    #[test]
    fn test_feedback_is_additive() {
        let p = profile(None, None, None);
        let plain = calculate(&p, None, None, 20.0, 50.0, 0);
        assert_eq!(calculate(&p, None, None, 20.0, 50.0, 10), plain + 10);
        assert_eq!(calculate(&p, None, None, 20.0, 50.0, -10), plain - 10);
    }

    #[test]
    fn test_large_negative_feedback_clamps_to_zero() {
        let p = profile(None, None, None);
        assert_eq!(calculate(&p, None, None, 20.0, 50.0, -10_000), 0);
    }

    #[test]
    fn test_climate_factors_floor() {
        let p = profile(None, None, None);
        let b = breakdown(&p, None, None, -200.0, 500.0, 0);
        assert_eq!(b.temperature_factor, CLIMATE_FACTOR_FLOOR);
        assert_eq!(b.humidity_factor, CLIMATE_FACTOR_FLOOR);
        assert!(b.volume_ml > 0);
    }

    #[test]
    fn test_hot_dry_air_increases_volume() {
        let p = profile(None, None, None);
        let mild = calculate(&p, None, None, 20.0, 50.0, 0);
        let hot = calculate(&p, None, None, 35.0, 20.0, 0);
        assert!(hot > mild);
    }

    #[test]
    fn test_thirsty_type_and_fast_material_increase_volume() {
        let p = profile(None, None, None);
        let cactus = calculate(&p, Some(15), Some(30), 20.0, 50.0, 0);
        let fern = calculate(&p, Some(80), Some(70), 20.0, 50.0, 0);
        assert!(fern > cactus);
    }

    #[test]
    fn test_zero_pot_size_gives_only_feedback() {
        let p = profile(None, Some(0), None);
        assert_eq!(calculate(&p, None, None, 20.0, 50.0, 0), 0);
        assert_eq!(calculate(&p, None, None, 20.0, 50.0, 12), 12);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: identical inputs give identical output
            #[test]
            fn prop_deterministic(
                height in proptest::option::of(0u32..500),
                pot in proptest::option::of(0u32..200),
                loosener in proptest::option::of(0u32..100),
                type_k in 1u8..=100,
                material_k in 1u8..=100,
                temp in -50.0f64..60.0,
                humidity in 0.0f64..100.0,
                feedback in -500i32..500,
            ) {
                let p = profile(height, pot, loosener);
                let a = calculate(&p, Some(type_k), Some(material_k), temp, humidity, feedback);
                let b = calculate(&p, Some(type_k), Some(material_k), temp, humidity, feedback);
                prop_assert_eq!(a, b);
            }

            // Property: climate factors never drop below the floor
            #[test]
            fn prop_climate_factors_bounded(
                temp in -1000.0f64..1000.0,
                humidity in -1000.0f64..1000.0,
            ) {
                let p = profile(None, None, None);
                let b = breakdown(&p, None, None, temp, humidity, 0);
                prop_assert!(b.temperature_factor >= CLIMATE_FACTOR_FLOOR);
                prop_assert!(b.humidity_factor >= CLIMATE_FACTOR_FLOOR);
            }

            // Property: without negative feedback a non-empty pot always gets water
            #[test]
            fn prop_positive_without_negative_feedback(
                pot in 5u32..200,
                type_k in 1u8..=100,
                material_k in 1u8..=100,
                temp in -1000.0f64..1000.0,
                humidity in -1000.0f64..1000.0,
            ) {
                let p = profile(None, Some(pot), None);
                let v = calculate(&p, Some(type_k), Some(material_k), temp, humidity, 0);
                prop_assert!(v > 0);
            }
        }
    }
}
