//! Session configuration.
//!
//! Settings are serialized as JSON so they can be exported, imported and
//! loaded from the user's config directory on native builds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOX_COLOR, DEFAULT_LABEL, DOUBLE_CLICK_MIN_POINTS, MIN_DRAG_DISTANCE,
    MIN_POLYGON_POINTS,
};
use crate::coords::ClampPolicy;
use crate::model::IdStrategy;
use crate::persist::FailurePolicy;
use crate::zoom::ZoomLimits;

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Settings for an annotation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Minimum normalized drag extent per axis for a box to be kept
    #[serde(default = "default_min_drag_distance")]
    pub min_drag_distance: f32,

    /// Minimum vertices for a polygon
    #[serde(default = "default_min_polygon_points")]
    pub min_polygon_points: usize,

    /// Buffered vertices required before a double-click finalizes
    #[serde(default = "default_double_click_min_points")]
    pub double_click_min_points: usize,

    /// Handling of pointer positions outside the surface
    #[serde(default)]
    pub clamp: ClampPolicy,

    /// Handling of failed saves/deletes
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Shape id generator
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Label for new shapes
    #[serde(default = "default_label")]
    pub default_label: String,

    /// Color for new boxes
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Zoom range and wheel step
    #[serde(default)]
    pub zoom: ZoomLimits,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_min_drag_distance() -> f32 {
    MIN_DRAG_DISTANCE
}

fn default_min_polygon_points() -> usize {
    MIN_POLYGON_POINTS
}

fn default_double_click_min_points() -> usize {
    DOUBLE_CLICK_MIN_POINTS
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_color() -> String {
    DEFAULT_BOX_COLOR.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            min_drag_distance: default_min_drag_distance(),
            min_polygon_points: default_min_polygon_points(),
            double_click_min_points: default_double_click_min_points(),
            clamp: ClampPolicy::default(),
            failure_policy: FailurePolicy::default(),
            id_strategy: IdStrategy::default(),
            default_label: default_label(),
            default_color: default_color(),
            zoom: ZoomLimits::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SessionConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that would break the state machine invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_drag_distance.is_finite() || self.min_drag_distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_drag_distance must be a non-negative number, got {}",
                self.min_drag_distance
            )));
        }
        if self.min_polygon_points < MIN_POLYGON_POINTS {
            return Err(ConfigError::Invalid(format!(
                "min_polygon_points must be at least {}, got {}",
                MIN_POLYGON_POINTS, self.min_polygon_points
            )));
        }
        if self.double_click_min_points == 0 {
            return Err(ConfigError::Invalid(
                "double_click_min_points must be at least 1".to_string(),
            ));
        }
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.max && zoom.step > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "zoom limits are inconsistent: min={} max={} step={}",
                zoom.min, zoom.max, zoom.step
            )));
        }
        Ok(())
    }

    /// Load and validate configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "annotation-canvas.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("annotation-canvas").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("annotation-canvas")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::from_file(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = SessionConfig::default();
        assert_eq!(config.min_drag_distance, 0.00625);
        assert_eq!(config.min_polygon_points, 3);
        assert_eq!(config.double_click_min_points, 2);
        assert_eq!(config.clamp, ClampPolicy::Clamp);
        assert_eq!(config.failure_policy, FailurePolicy::FlagUnsaved);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = SessionConfig::from_json(r#"{"version":1,"clamp":"overflow"}"#).unwrap();
        assert_eq!(config.clamp, ClampPolicy::Overflow);
        assert_eq!(config.min_polygon_points, 3);
        assert_eq!(config.default_label, "object");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = SessionConfig::default();
        config.failure_policy = FailurePolicy::Revert;
        config.id_strategy = IdStrategy::Sequential;
        let parsed = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = SessionConfig::from_json(r#"{"version":99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_polygon_minimum_below_three() {
        let err = SessionConfig::from_json(r#"{"version":1,"min_polygon_points":2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_inverted_zoom_limits() {
        let json = r#"{"version":1,"zoom":{"min":5.0,"max":1.0,"step":1.1}}"#;
        assert!(matches!(
            SessionConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    }
}
