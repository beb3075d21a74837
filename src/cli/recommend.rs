//! Recommend command for waterlog.
//!
//! Prints the recommended watering volume for a plant, optionally with the
//! factors that produced it.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::{format_failure, CommandError, CommandOutput};
use crate::config::Config;
use crate::core::{EventId, PlantId, Recommendation, VolumeBreakdown, WateringService};
use crate::storage::DiaryStore;

/// Options for the recommend command.
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    /// Output as JSON.
    pub json: bool,
    /// Include the factor breakdown.
    pub explain: bool,
    /// Processing date (default: today).
    pub as_of: Option<NaiveDate>,
}

/// Output format for the recommend command.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendOutput {
    /// Whether a recommendation was produced.
    pub success: bool,
    /// The recommendation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    /// Factor breakdown, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<VolumeBreakdown>,
    /// Event whose error fed the correction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_from: Option<EventId>,
    /// Error details if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl RecommendOutput {
    /// Create a successful output.
    pub fn success(recommendation: Recommendation) -> Self {
        Self {
            success: true,
            recommendation: Some(recommendation),
            breakdown: None,
            feedback_from: None,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: CommandError) -> Self {
        Self {
            success: false,
            recommendation: None,
            breakdown: None,
            feedback_from: None,
            error: Some(error),
        }
    }
}

impl CommandOutput for RecommendOutput {
    fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }
}

/// The recommend command implementation.
pub struct RecommendCommand<S: DiaryStore> {
    service: WateringService<S>,
}

impl<S: DiaryStore> RecommendCommand<S> {
    /// Create a new recommend command.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            service: WateringService::with_config(store, &config.engine),
        }
    }

    /// Run the recommend command.
    pub fn run(&self, plant_id: PlantId, options: &RecommendOptions) -> RecommendOutput {
        let today = options.as_of.unwrap_or_else(|| Local::now().date_naive());

        match self.service.explain_at(plant_id, today) {
            Ok(explanation) => {
                let mut output = RecommendOutput::success(explanation.recommendation);
                if options.explain {
                    output.breakdown = Some(explanation.breakdown);
                    output.feedback_from = explanation.last_event.map(|e| e.id);
                }
                output
            }
            Err(e) => RecommendOutput::failure(CommandError::from(&e)),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RecommendOutput, options: &RecommendOptions) -> String {
        if options.json {
            output.to_json()
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &RecommendOutput) -> String {
        let Some(rec) = output.recommendation.as_ref() else {
            return format_failure("Recommendation", output.error.as_ref());
        };

        let mut text = format!(
            "Plant {}: water {} {}\n",
            rec.plant_id, rec.recommended_volume_ml, rec.unit
        );

        if let Some(b) = &output.breakdown {
            text.push_str(&format!("  base volume  {} mL\n", b.base_volume_ml));
            text.push_str(&format!("  height       x{:.3}\n", b.height_factor));
            text.push_str(&format!("  plant type   x{:.3}\n", b.type_factor));
            text.push_str(&format!("  material     x{:.3}\n", b.material_factor));
            text.push_str(&format!("  soil         x{:.3}\n", b.soil_factor));
            text.push_str(&format!("  temperature  x{:.3}\n", b.temperature_factor));
            text.push_str(&format!("  humidity     x{:.3}\n", b.humidity_factor));
            match output.feedback_from {
                Some(event) => text.push_str(&format!(
                    "  feedback     {:+} mL (from event {})\n",
                    b.feedback_ml, event
                )),
                None => text.push_str("  feedback     none (no watering history)\n"),
            }
        }

        text
    }
}
