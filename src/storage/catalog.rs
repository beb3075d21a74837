//! Built-in reference catalog of plant types and pot materials.
//!
//! Coefficients are 1..=100. Types: higher means thirstier. Materials:
//! higher means the pot loses water faster.

use serde::Serialize;

use crate::core::model::{Material, MaterialId, PlantType, PlantTypeId};
use crate::core::registry;
use crate::error::Result;
use crate::storage::DiaryStore;

/// Pot materials as (name, coefficient).
pub const MATERIALS: &[(&str, u8)] = &[
    ("Ceramic", 30),
    ("Plastic", 70),
    ("Clay", 25),
    ("Terracotta", 28),
    ("Metal", 80),
    ("Wood", 40),
    ("Glass", 50),
    ("Concrete", 35),
    ("Porcelain", 32),
    ("Self-watering planter", 20),
];

/// Plant types as (name, description, coefficient).
pub const PLANT_TYPES: &[(&str, &str, u8)] = &[
    ("Cactus", "Spiny succulents with fleshy water-storing stems", 15),
    ("Aloe", "Succulent rosettes of thick fleshy leaves", 20),
    ("Sansevieria", "Stiff upright leaves, also called snake plant", 22),
    ("Crassula", "Succulent shrub known as the money tree", 18),
    ("Monstera", "Tropical climber with large split leathery leaves", 52),
    ("Ficus", "Trees and shrubs of the fig family with decorative foliage", 48),
    ("Dracaena", "Tree-like plants with a tuft of leaves at the top", 45),
    ("Chlorophytum", "Spider plant with arching leaves and runners", 50),
    ("Dieffenbachia", "Large oblong leaves, often variegated", 55),
    ("Zamioculcas", "Fleshy rhizomes and glossy compound leaves", 35),
    ("Violet", "Low rosette plant with clustered flowers", 65),
    ("Orchid", "Phalaenopsis and relatives", 55),
    ("Spathiphyllum", "Peace lily with a white spathe", 70),
    ("Anthurium", "Leathery leaves and a bright red spathe", 68),
    ("Begonia", "Asymmetric leaves and bright flowers", 62),
    ("Geranium", "Aromatic leaves and umbels of bright flowers", 58),
    ("Fern", "Large pinnate fronds, Nephrolepis is the usual pick", 80),
    ("Tradescantia", "Trailing stems with often striped leaves", 72),
    ("Chamaedorea", "Small feather-leaved palm", 58),
    ("Date palm", "Young date palms grown indoors", 55),
    ("Lemon", "Small evergreen citrus tree", 65),
    ("Basil", "Aromatic culinary herb", 70),
    ("Mint", "Fast-growing aromatic herb", 72),
    ("Calathea", "Patterned leaves that fold at night", 58),
    ("Ivy", "Evergreen climbing vine", 68),
];

/// What a seeding run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub plant_types_added: usize,
    pub materials_added: usize,
}

/// Catalog plant types with IDs assigned from 1 in listing order.
pub fn plant_types() -> Vec<PlantType> {
    PLANT_TYPES
        .iter()
        .zip(1u32..)
        .map(|(&(name, description, coefficient), id)| PlantType {
            id: PlantTypeId(id),
            name: name.to_string(),
            description: description.to_string(),
            coefficient,
        })
        .collect()
}

/// Catalog materials with IDs assigned from 1 in listing order.
pub fn materials() -> Vec<Material> {
    MATERIALS
        .iter()
        .zip(1u32..)
        .map(|(&(name, coefficient), id)| Material {
            id: MaterialId(id),
            name: name.to_string(),
            coefficient,
        })
        .collect()
}

/// Load the catalog into an empty store.
///
/// Each table is seeded only when it has no rows yet, so running this
/// twice is harmless and never overwrites user-maintained reference data.
pub fn seed<S: DiaryStore>(store: &S) -> Result<SeedReport> {
    seed_with(store, &plant_types(), &materials())
}

/// Seed the given reference data, checking every coefficient on the way in.
pub fn seed_with<S: DiaryStore>(
    store: &S,
    plant_types: &[PlantType],
    materials: &[Material],
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if store.material_count()? == 0 {
        for material in materials {
            registry::put_material(store, material)?;
            report.materials_added += 1;
        }
    } else {
        tracing::debug!("materials already present, skipping seed");
    }

    if store.plant_type_count()? == 0 {
        for plant_type in plant_types {
            registry::put_plant_type(store, plant_type)?;
            report.plant_types_added += 1;
        }
    } else {
        tracing::debug!("plant types already present, skipping seed");
    }

    tracing::info!(
        plant_types = report.plant_types_added,
        materials = report.materials_added,
        "reference catalog seeded"
    );
    Ok(report)
}
