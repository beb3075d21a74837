//! Water command for waterlog.
//!
//! Records, amends and removes watering events. Every recorded event
//! carries its error against the recommendation in effect before it.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::{format_failure, CommandError, CommandOutput};
use crate::config::Config;
use crate::core::{EventId, WateringEvent, WateringPatch, WateringRequest, WateringService};
use crate::error::Result;
use crate::storage::DiaryStore;

/// Options for the water command.
#[derive(Debug, Clone, Default)]
pub struct WaterOptions {
    /// Output as JSON.
    pub json: bool,
    /// Processing date (default: today).
    pub as_of: Option<NaiveDate>,
}

/// What the command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterAction {
    Recorded,
    Amended,
    Removed,
}

/// Output format for the water command.
#[derive(Debug, Clone, Serialize)]
pub struct WaterOutput {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The operation attempted.
    pub action: WaterAction,
    /// The event as stored (or as it was before removal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<WateringEvent>,
    /// Error details if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl WaterOutput {
    fn from_result(action: WaterAction, result: Result<WateringEvent>) -> Self {
        match result {
            Ok(event) => Self {
                success: true,
                action,
                event: Some(event),
                error: None,
            },
            Err(e) => Self {
                success: false,
                action,
                event: None,
                error: Some(CommandError::from(&e)),
            },
        }
    }
}

impl CommandOutput for WaterOutput {
    fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }
}

/// The water command implementation.
pub struct WaterCommand<S: DiaryStore> {
    service: WateringService<S>,
}

impl<S: DiaryStore> WaterCommand<S> {
    /// Create a new water command.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            service: WateringService::with_config(store, &config.engine),
        }
    }

    fn today(options: &WaterOptions) -> NaiveDate {
        options.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Record a new watering.
    pub fn record(&self, request: &WateringRequest, options: &WaterOptions) -> WaterOutput {
        let result = self.service.ingest_at(request, Self::today(options));
        WaterOutput::from_result(WaterAction::Recorded, result)
    }

    /// Amend an existing watering.
    pub fn amend(&self, id: EventId, patch: &WateringPatch, options: &WaterOptions) -> WaterOutput {
        let result = self.service.amend_at(id, patch, Self::today(options));
        WaterOutput::from_result(WaterAction::Amended, result)
    }

    /// Remove a watering.
    pub fn remove(&self, id: EventId) -> WaterOutput {
        let result = self.service.remove_watering_event(id);
        WaterOutput::from_result(WaterAction::Removed, result)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &WaterOutput, options: &WaterOptions) -> String {
        if options.json {
            output.to_json()
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &WaterOutput) -> String {
        let verb = match output.action {
            WaterAction::Recorded => "Recording",
            WaterAction::Amended => "Amending",
            WaterAction::Removed => "Removing",
        };
        let Some(event) = output.event.as_ref() else {
            return format_failure(verb, output.error.as_ref());
        };

        match output.action {
            WaterAction::Removed => format!(
                "Removed event {} (plant {}, {}).\n",
                event.id, event.plant_id, event.date
            ),
            action => {
                let label = if action == WaterAction::Recorded {
                    "Recorded"
                } else {
                    "Amended"
                };
                format!(
                    "{} event {}: plant {}, {} {}, {} mL applied ({}).\n",
                    label,
                    event.id,
                    event.plant_id,
                    event.date,
                    event.time.format("%H:%M"),
                    event.applied_volume_ml,
                    describe_error(event.error_ml)
                )
            }
        }
    }
}

/// Describe an error term from the grower's point of view.
fn describe_error(error_ml: i32) -> String {
    match error_ml {
        0 => "exactly as recommended".to_string(),
        e if e > 0 => format!("{} mL less than recommended", e),
        e => format!("{} mL more than recommended", e.unsigned_abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        ClimateId, ClimateSnapshot, MaterialId, PlantId, PlantProfile, PlantTypeId, UserId,
    };
    use crate::error::exit_codes;
    use crate::storage::traits::tests::date;
    use crate::storage::{catalog, MemoryDiaryStore};
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn setup() -> (WaterCommand<Arc<MemoryDiaryStore>>, Arc<MemoryDiaryStore>) {
        let store = Arc::new(MemoryDiaryStore::new());
        catalog::seed(&store).unwrap();
        store
            .put_plant_profile(&PlantProfile::new(
                PlantId(1),
                "aloe",
                UserId(1),
                PlantTypeId(2),
                MaterialId(1),
            ))
            .unwrap();
        store
            .put_climate_snapshot(&ClimateSnapshot {
                id: ClimateId(1),
                user_id: UserId(1),
                date: date("2026-10-10"),
                temperature_c: 20.0,
                humidity_pct: 50.0,
            })
            .unwrap();
        (
            WaterCommand::new(Arc::clone(&store), &Config::default()),
            store,
        )
    }

    fn options() -> WaterOptions {
        WaterOptions {
            json: false,
            as_of: Some(date("2026-10-18")),
        }
    }

    fn request(day: &str, volume: i64) -> WateringRequest {
        WateringRequest::new(
            PlantId(1),
            date(day),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            volume,
        )
    }

    #[test]
    fn test_record_success() {
        let (cmd, store) = setup();
        let output = cmd.record(&request("2026-10-17", 40), &options());

        assert!(output.success);
        assert_eq!(output.exit_code(), exit_codes::OK);
        assert_eq!(store.event_count(), 1);
        let text = cmd.format_output(&output, &options());
        assert!(text.starts_with("Recorded event 1: plant 1, 2026-10-17 18:30, 40 mL applied"));
    }

    #[test]
    fn test_record_duplicate_exit_code() {
        let (cmd, _store) = setup();
        cmd.record(&request("2026-10-17", 40), &options());
        let output = cmd.record(&request("2026-10-17", 40), &options());

        assert!(!output.success);
        assert_eq!(output.exit_code(), exit_codes::CONFLICT);
        assert!(cmd
            .format_output(&output, &options())
            .starts_with("Recording failed: conflict:"));
    }

    #[test]
    fn test_record_stale_exit_code() {
        let (cmd, store) = setup();
        let output = cmd.record(&request("2026-10-01", 40), &options());

        assert_eq!(output.exit_code(), exit_codes::VALIDATION);
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_amend_and_remove() {
        let (cmd, store) = setup();
        let recorded = cmd.record(&request("2026-10-17", 40), &options());
        let id = recorded.event.unwrap().id;

        let patch = WateringPatch {
            applied_volume_ml: Some(60),
            ..Default::default()
        };
        let amended = cmd.amend(id, &patch, &options());
        assert!(amended.success);
        assert_eq!(amended.event.as_ref().unwrap().applied_volume_ml, 60);

        let removed = cmd.remove(id);
        assert!(removed.success);
        assert_eq!(store.event_count(), 0);
        assert!(cmd
            .format_output(&removed, &options())
            .starts_with("Removed event"));

        assert_eq!(cmd.remove(id).exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_json_output() {
        let (cmd, _store) = setup();
        let opts = WaterOptions {
            json: true,
            ..options()
        };
        let output = cmd.record(&request("2026-10-17", 40), &opts);
        let json: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &opts)).unwrap();

        assert_eq!(json["action"], "recorded");
        assert_eq!(json["event"]["applied_volume_ml"], 40);
        assert_eq!(json["event"]["date"], "2026-10-17");
    }

    #[test]
    fn test_describe_error() {
        assert_eq!(describe_error(0), "exactly as recommended");
        assert_eq!(describe_error(12), "12 mL less than recommended");
        assert_eq!(describe_error(-7), "7 mL more than recommended");
    }
}
