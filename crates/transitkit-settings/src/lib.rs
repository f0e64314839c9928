//! TransitKit Settings Crate
//!
//! Handles application configuration and settings persistence.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    CameraSettings, Config, ConfigFormat, HistorySettings, LoggingSettings, Theme, UiSettings,
    WorldSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
