//! History command for waterlog.
//!
//! Lists recorded waterings oldest first.

use serde::Serialize;

use crate::cli::{format_failure, CommandError, CommandOutput};
use crate::config::Config;
use crate::core::{EventFilter, WateringEvent, WateringService};
use crate::storage::DiaryStore;

/// Options for the history command.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Show only the most recent N events.
    pub limit: Option<usize>,
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryOutput {
    /// Whether the listing succeeded.
    pub success: bool,
    /// Matching events, oldest first.
    pub events: Vec<WateringEvent>,
    /// Total matches before the limit was applied.
    pub total: usize,
    /// Error details if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl HistoryOutput {
    /// Create a successful output.
    pub fn success(events: Vec<WateringEvent>, total: usize) -> Self {
        Self {
            success: true,
            events,
            total,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: CommandError) -> Self {
        Self {
            success: false,
            events: Vec::new(),
            total: 0,
            error: Some(error),
        }
    }
}

impl CommandOutput for HistoryOutput {
    fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }
}

/// The history command implementation.
pub struct HistoryCommand<S: DiaryStore> {
    service: WateringService<S>,
}

impl<S: DiaryStore> HistoryCommand<S> {
    /// Create a new history command.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            service: WateringService::with_config(store, &config.engine),
        }
    }

    /// Run the history command.
    pub fn run(&self, filter: &EventFilter, options: &HistoryOptions) -> HistoryOutput {
        match self.service.history(filter) {
            Ok(mut events) => {
                let total = events.len();
                if let Some(limit) = options.limit {
                    events = events.split_off(total.saturating_sub(limit));
                }
                HistoryOutput::success(events, total)
            }
            Err(e) => HistoryOutput::failure(CommandError::from(&e)),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HistoryOutput, options: &HistoryOptions) -> String {
        if options.json {
            output.to_json()
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &HistoryOutput) -> String {
        if !output.success {
            return format_failure("History", output.error.as_ref());
        }
        if output.events.is_empty() {
            return "No waterings recorded.\n".to_string();
        }

        let mut text = String::new();
        text.push_str("  ID  PLANT  DATE        TIME    APPLIED     ERROR\n");
        for e in &output.events {
            text.push_str(&format!(
                "{:>4}  {:>5}  {}  {}  {:>5} mL  {:>+5} mL\n",
                e.id,
                e.plant_id,
                e.date,
                e.time.format("%H:%M"),
                e.applied_volume_ml,
                e.error_ml
            ));
        }
        if output.events.len() < output.total {
            text.push_str(&format!(
                "({} of {} shown)\n",
                output.events.len(),
                output.total
            ));
        }
        text
    }
}
