//! Configuration for TransitKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files, chosen by extension.
//!
//! Configuration is organized into logical sections:
//! - UI preferences (splash screen, theme)
//! - Camera defaults (zoom range and step)
//! - History capacity
//! - Size of the world of a new project
//! - Logging level

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use transitkit_core::constants::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_METERS_PER_PIXEL, MAX_METERS_PER_PIXEL, MIN_METERS_PER_PIXEL,
};

use crate::error::{SettingsError, SettingsResult};

/// Maximum number of remembered project paths
pub const RECENT_PROJECTS_COUNT: usize = 10;

/// Theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow system preference
    #[default]
    System,
    /// Force light theme
    Light,
    /// Force dark theme
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "System"),
            Self::Light => write!(f, "Light"),
            Self::Dark => write!(f, "Dark"),
        }
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Show the splash screen while starting
    pub show_splash: bool,
    pub theme: Theme,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_splash: true,
            theme: Theme::System,
        }
    }
}

/// Camera defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Zoom of a new camera in metres per pixel
    pub default_meters_per_pixel: f64,
    pub min_meters_per_pixel: f64,
    pub max_meters_per_pixel: f64,
    /// Factor of one zoom step, greater than one
    pub zoom_step: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            default_meters_per_pixel: DEFAULT_METERS_PER_PIXEL,
            min_meters_per_pixel: MIN_METERS_PER_PIXEL,
            max_meters_per_pixel: MAX_METERS_PER_PIXEL,
            zoom_step: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Number of undoable commands kept
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Size of the world of a new project, in segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub default_columns: usize,
    pub default_rows: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            default_columns: 1,
            default_rows: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// File format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("").to_string(),
            )),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Recently opened projects, newest first
    pub recent_projects: Vec<PathBuf>,
    pub ui: UiSettings,
    pub camera: CameraSettings,
    pub history: HistorySettings,
    pub world: WorldSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> SettingsResult<Self> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, format)
    }

    /// Serialize config in the given format
    pub fn to_string_as(&self, format: ConfigFormat) -> SettingsResult<String> {
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = self.to_string_as(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let camera = &self.camera;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(camera.min_meters_per_pixel) || !positive(camera.max_meters_per_pixel) {
            return Err(SettingsError::invalid(
                "camera",
                "zoom limits must be positive",
            ));
        }
        if camera.min_meters_per_pixel > camera.max_meters_per_pixel {
            return Err(SettingsError::invalid(
                "camera",
                "min_meters_per_pixel exceeds max_meters_per_pixel",
            ));
        }
        if !(camera.min_meters_per_pixel..=camera.max_meters_per_pixel)
            .contains(&camera.default_meters_per_pixel)
        {
            return Err(SettingsError::invalid(
                "camera.default_meters_per_pixel",
                "must lie within the zoom limits",
            ));
        }
        if !(camera.zoom_step.is_finite() && camera.zoom_step > 1.0) {
            return Err(SettingsError::invalid("camera.zoom_step", "must be > 1"));
        }

        if self.history.capacity == 0 {
            return Err(SettingsError::invalid("history.capacity", "must be > 0"));
        }

        if self.world.default_columns == 0 || self.world.default_rows == 0 {
            return Err(SettingsError::invalid("world", "dimensions must be > 0"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::invalid("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Add project to the recent projects list
    pub fn add_recent_project(&mut self, path: PathBuf) {
        self.recent_projects.retain(|p| p != &path);
        self.recent_projects.insert(0, path);
        self.recent_projects.truncate(RECENT_PROJECTS_COUNT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.capacity, 100);
        assert!(config.ui.show_splash);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::parse(
            "[history]\ncapacity = 25\n\n[ui]\ntheme = \"dark\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.history.capacity, 25);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert!(config.ui.show_splash);
        assert_eq!(config.camera, CameraSettings::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));

        let mut config = Config::default();
        config.camera.min_meters_per_pixel = 10.0;
        config.camera.max_meters_per_pixel = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.zoom_step = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/config.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_recent_projects() {
        let mut config = Config::default();
        for i in 0..12 {
            config.add_recent_project(PathBuf::from(format!("p{i}")));
        }
        config.add_recent_project(PathBuf::from("p5"));
        assert_eq!(config.recent_projects.len(), RECENT_PROJECTS_COUNT);
        assert_eq!(config.recent_projects[0], PathBuf::from("p5"));
        assert_eq!(config.recent_projects[1], PathBuf::from("p11"));
    }
}
