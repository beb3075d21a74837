//! Configuration loading for waterlog.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.waterlog/config.toml`)
//! 3. User config (`~/.waterlog/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::correction::DEFAULT_CAP_RATIO;
use crate::core::pipeline::DEFAULT_FRESHNESS_DAYS;
use crate::error::{Result, WaterlogError};

/// Name of the per-user and per-project directory.
pub const WATERLOG_DIR: &str = ".waterlog";

/// File name of the diary inside the waterlog home.
pub const DIARY_FILE: &str = "diary.json";

/// Main configuration struct for waterlog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Recommendation and ingestion settings.
    pub engine: EngineConfig,
    /// Where the diary lives.
    pub storage: StorageConfig,
}

/// Recommendation and ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Events dated more than this many days before processing are stale.
    pub freshness_days: u32,
    /// Feedback is capped at this share of the base volume.
    pub feedback_cap_ratio: f64,
}

impl EngineConfig {
    /// Check if a cap ratio is usable (finite, in `[0.0, 1.0]`).
    pub fn is_valid_cap_ratio(value: f64) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            feedback_cap_ratio: DEFAULT_CAP_RATIO,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Diary file. Defaults to `<waterlog_home>/diary.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();
        config
    }

    /// Load user config from `~/.waterlog/config.toml`.
    fn load_user_config() -> Option<Config> {
        let path = waterlog_home()?.join("config.toml");
        Self::load_optional(&path)
    }

    /// Load project config from the nearest `.waterlog/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let path = project_config_dir(cwd)?.join("config.toml");
        Self::load_optional(&path)
    }

    /// A missing file is silent; an unreadable one is warned about.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    ///
    /// Out-of-range values are warned about and replaced by their
    /// defaults, the same way environment overrides are treated.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| WaterlogError::storage(path, e))?;
        let mut config: Config =
            toml::from_str(&content).map_err(|e| WaterlogError::config(e.to_string()))?;

        if !EngineConfig::is_valid_cap_ratio(config.engine.feedback_cap_ratio) {
            tracing::warn!(
                "Invalid feedback_cap_ratio {} in {}. \
                Must be in range [0.0, 1.0]. Using '{}'.",
                config.engine.feedback_cap_ratio,
                path.display(),
                DEFAULT_CAP_RATIO
            );
            config.engine.feedback_cap_ratio = DEFAULT_CAP_RATIO;
        }

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // WATERLOG_FRESHNESS_DAYS
        if let Ok(val) = env::var("WATERLOG_FRESHNESS_DAYS") {
            match val.parse::<u32>() {
                Ok(n) => self.engine.freshness_days = n,
                Err(_) => tracing::warn!(
                    "Invalid WATERLOG_FRESHNESS_DAYS value '{}'. \
                    Expected a non-negative integer. Using '{}'.",
                    val,
                    self.engine.freshness_days
                ),
            }
        }

        // WATERLOG_FEEDBACK_CAP_RATIO
        if let Ok(val) = env::var("WATERLOG_FEEDBACK_CAP_RATIO") {
            match val.parse::<f64>() {
                Ok(n) if EngineConfig::is_valid_cap_ratio(n) => {
                    self.engine.feedback_cap_ratio = n;
                }
                Ok(n) => tracing::warn!(
                    "Invalid WATERLOG_FEEDBACK_CAP_RATIO value '{}'. \
                    Must be in range [0.0, 1.0]. Using '{}'.",
                    n,
                    self.engine.feedback_cap_ratio
                ),
                Err(_) => tracing::warn!(
                    "Invalid WATERLOG_FEEDBACK_CAP_RATIO value '{}'. \
                    Expected a decimal number. Using '{}'.",
                    val,
                    self.engine.feedback_cap_ratio
                ),
            }
        }

        // WATERLOG_DATA_FILE
        if let Ok(val) = env::var("WATERLOG_DATA_FILE") {
            if val.is_empty() {
                tracing::warn!("WATERLOG_DATA_FILE is empty, ignoring");
            } else {
                self.storage.data_file = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field by field: every non-default value in `other` wins. A layer
    /// cannot reset a value to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_engine = EngineConfig::default();
        if other.engine.freshness_days != default_engine.freshness_days {
            self.engine.freshness_days = other.engine.freshness_days;
        }
        if other.engine.feedback_cap_ratio != default_engine.feedback_cap_ratio {
            self.engine.feedback_cap_ratio = other.engine.feedback_cap_ratio;
        }

        if other.storage.data_file.is_some() {
            self.storage.data_file = other.storage.data_file;
        }

        self
    }

    /// The diary file this config points at.
    pub fn diary_path(&self) -> Option<PathBuf> {
        self.storage.data_file.clone().or_else(default_diary_path)
    }
}

/// Get the waterlog home directory.
///
/// Checks `WATERLOG_HOME` first, then falls back to `~/.waterlog`. An empty
/// `WATERLOG_HOME` is ignored.
pub fn waterlog_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("WATERLOG_HOME") {
        if home.is_empty() {
            tracing::warn!("WATERLOG_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("WATERLOG_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(WATERLOG_DIR));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = env::temp_dir().join("waterlog");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Default diary location: `<waterlog_home>/diary.json`.
pub fn default_diary_path() -> Option<PathBuf> {
    waterlog_home().map(|h| h.join(DIARY_FILE))
}

/// The nearest `.waterlog/` directory at or above `cwd`, if any.
pub fn project_config_dir(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|ancestor| ancestor.join(WATERLOG_DIR))
        .find(|dir| dir.is_dir())
}
