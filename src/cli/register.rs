//! Setup commands for waterlog.
//!
//! Seeds the reference catalog and registers plants and climate readings.

use serde::Serialize;

use crate::cli::{format_failure, CommandError, CommandOutput};
use crate::core::registry;
use crate::core::{ClimateSnapshot, NewClimate, NewPlant, PlantProfile};
use crate::error::Result;
use crate::storage::catalog::{self, SeedReport};
use crate::storage::DiaryStore;

/// Options for the setup commands.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Output as JSON.
    pub json: bool,
}

/// What was registered.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registered {
    Seed(SeedReport),
    Plant(PlantProfile),
    Climate(ClimateSnapshot),
}

/// Output format for the setup commands.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterOutput {
    /// Whether the write succeeded.
    pub success: bool,
    /// The stored record or seeding summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered: Option<Registered>,
    /// Error details if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl RegisterOutput {
    fn from_result(result: Result<Registered>) -> Self {
        match result {
            Ok(registered) => Self {
                success: true,
                registered: Some(registered),
                error: None,
            },
            Err(e) => Self {
                success: false,
                registered: None,
                error: Some(CommandError::from(&e)),
            },
        }
    }
}

impl CommandOutput for RegisterOutput {
    fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }
}

/// The setup command implementation.
pub struct RegisterCommand<S: DiaryStore> {
    store: S,
}

impl<S: DiaryStore> RegisterCommand<S> {
    /// Create a new setup command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the reference catalog into empty tables.
    pub fn seed(&self) -> RegisterOutput {
        RegisterOutput::from_result(catalog::seed(&self.store).map(Registered::Seed))
    }

    /// Register a plant.
    pub fn add_plant(&self, plant: NewPlant) -> RegisterOutput {
        RegisterOutput::from_result(
            registry::register_plant(&self.store, plant).map(Registered::Plant),
        )
    }

    /// Record a climate reading.
    pub fn add_climate(&self, climate: NewClimate) -> RegisterOutput {
        RegisterOutput::from_result(
            registry::record_climate(&self.store, climate).map(Registered::Climate),
        )
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RegisterOutput, options: &RegisterOptions) -> String {
        if options.json {
            output.to_json()
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &RegisterOutput) -> String {
        match &output.registered {
            Some(Registered::Seed(report)) => {
                if report.plant_types_added == 0 && report.materials_added == 0 {
                    "Reference catalog already present.\n".to_string()
                } else {
                    format!(
                        "Seeded {} plant types and {} materials.\n",
                        report.plant_types_added, report.materials_added
                    )
                }
            }
            Some(Registered::Plant(p)) => format!(
                "Registered plant {} ({}) for user {}.\n",
                p.id, p.name, p.user_id
            ),
            Some(Registered::Climate(c)) => format!(
                "Recorded climate {} for user {} on {}: {} °C, {} % humidity.\n",
                c.id, c.user_id, c.date, c.temperature_c, c.humidity_pct
            ),
            None => format_failure("Registration", output.error.as_ref()),
        }
    }
}
