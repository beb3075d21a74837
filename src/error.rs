//! Unified error types for waterlog.
//!
//! Every failure carries a human-readable reason and a fixed
//! [`ErrorCategory`]. Callers branch on the category; the reason is for
//! people. Nothing in the engine is retried: all failures are deterministic
//! functions of the current data.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Which piece of reference data a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Plant,
    PlantType,
    Material,
    Climate,
    WateringEvent,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plant => "plant",
            Self::PlantType => "plant type",
            Self::Material => "material",
            Self::Climate => "climate snapshot",
            Self::WateringEvent => "watering event",
        };
        f.write_str(name)
    }
}

/// Why a write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// An event already exists for the same plant and date.
    DuplicateEvent,
    /// Reference data needed for the calculation is missing.
    IncompleteData,
}

/// Fixed error category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// The main error type for waterlog operations.
#[derive(Error, Debug)]
pub enum WaterlogError {
    /// Missing required field or value outside its allowed range.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A referenced identifier does not resolve.
    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: String },

    /// The write would violate a data invariant.
    #[error("conflict: {message}")]
    Conflict { kind: ConflictKind, message: String },

    /// I/O errors from the on-disk diary.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for waterlog operations.
pub type Result<T> = std::result::Result<T, WaterlogError>;

impl WaterlogError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error naming the missing piece.
    pub fn not_found(resource: Resource, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a duplicate-event conflict.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::DuplicateEvent,
            message: message.into(),
        }
    }

    /// Create an incomplete-data conflict.
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::Conflict {
            kind: ConflictKind::IncompleteData,
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The fixed category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Storage { .. } | Self::Serde { .. } | Self::Config { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Re-classify a lookup failure found while reconstructing historical
    /// context. Missing reference data there is a data-integrity problem,
    /// not a request mistake.
    pub fn into_incomplete_data(self) -> Self {
        match self {
            Self::NotFound { resource, id } => Self::incomplete(format!(
                "incomplete plant data: {} {} is missing",
                resource, id
            )),
            other => other,
        }
    }
}

impl From<io::Error> for WaterlogError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for WaterlogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Exit codes for the waterlog CLI.
pub mod exit_codes {
    use super::ErrorCategory;

    /// Command succeeded.
    pub const OK: i32 = 0;

    /// Storage, serialization or configuration failure.
    pub const INTERNAL: i32 = 1;

    /// Input rejected.
    pub const VALIDATION: i32 = 2;

    /// Referenced record does not exist.
    pub const NOT_FOUND: i32 = 3;

    /// Duplicate event or incomplete reference data.
    pub const CONFLICT: i32 = 4;

    /// Map an error category to its exit code.
    pub fn for_category(category: ErrorCategory) -> i32 {
        match category {
            ErrorCategory::Validation => VALIDATION,
            ErrorCategory::NotFound => NOT_FOUND,
            ErrorCategory::Conflict => CONFLICT,
            ErrorCategory::Internal => INTERNAL,
        }
    }
}
