//! CLI commands for waterlog.
//!
//! Each command takes options, returns a serializable output, and formats
//! that output as human-readable text or JSON:
//! - **Engine commands**: recommend, water (record, amend, remove), history
//! - **Setup commands**: seed, plant add, climate add

pub mod history;
pub mod recommend;
pub mod register;
pub mod water;

pub use history::HistoryCommand;
pub use recommend::RecommendCommand;
pub use register::RegisterCommand;
pub use water::WaterCommand;

use serde::Serialize;

use crate::error::{exit_codes, ErrorCategory, WaterlogError};

/// Failure details attached to a command output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandError {
    /// Fixed error category.
    pub category: ErrorCategory,
    /// Human-readable reason.
    pub message: String,
}

impl From<&WaterlogError> for CommandError {
    fn from(err: &WaterlogError) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

/// Common behaviour of command outputs.
pub trait CommandOutput: Serialize {
    /// The failure, if the command failed.
    fn error(&self) -> Option<&CommandError>;

    /// Process exit code for this output.
    fn exit_code(&self) -> i32 {
        self.error()
            .map_or(exit_codes::OK, |e| exit_codes::for_category(e.category))
    }

    /// Pretty JSON rendering.
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Human-readable failure line shared by all commands.
pub(crate) fn format_failure(action: &str, error: Option<&CommandError>) -> String {
    format!(
        "{} failed: {}\n",
        action,
        error.map_or("unknown error", |e| e.message.as_str())
    )
}
