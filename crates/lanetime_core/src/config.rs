//! View configuration.
//!
//! # Responsibility
//! - Load view defaults (week start, default range, layout policy) from JSON.
//! - Reject configurations the timeline engine cannot honor.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - `min_event_width_percent` is finite and within `[0, 100]`.

use crate::logging::{default_log_level, normalize_level};
use crate::timeline::layout::LayoutStrategy;
use crate::timeline::placement::DEFAULT_MIN_EVENT_WIDTH_PERCENT;
use crate::timeline::window::RangeSelector;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Conventional config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "lanetime.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Timeline view defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// First day of the week for `1week`/`2weeks` windows.
    pub week_start: Weekday,
    /// Range used when the caller does not pick one.
    pub default_range: RangeSelector,
    /// Minimum rendered bar width in percent, so instants stay visible.
    pub min_event_width_percent: f64,
    pub layout_strategy: LayoutStrategy,
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            default_range: RangeSelector::ThreeDays,
            min_event_width_percent: DEFAULT_MIN_EVENT_WIDTH_PERCENT,
            layout_strategy: LayoutStrategy::ChainedClusters,
            log_level: None,
        }
    }
}

impl ViewConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.min_event_width_percent;
        if !width.is_finite() || !(0.0..=100.0).contains(&width) {
            return Err(ConfigError::Invalid(format!(
                "min_event_width_percent must be within [0, 100], got {width}"
            )));
        }
        if let Some(level) = &self.log_level {
            normalize_level(level).map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// Effective log level: configured value, else the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}
