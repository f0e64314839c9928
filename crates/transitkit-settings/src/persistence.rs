//! Settings Persistence
//!
//! Resolves the configuration file, loads it (falling back to defaults when
//! it does not exist yet) and saves it back.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};

/// Directory created under the platform configuration directory
pub const APP_DIR_NAME: &str = "transitkit";

/// File name of the configuration inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
    config: Config,
}

impl SettingsPersistence {
    /// Create a persistence layer with default config stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Config::default(),
        }
    }

    /// Configuration directory: `home` if given, otherwise
    /// `<platform config dir>/transitkit`
    pub fn config_dir(home: Option<&Path>) -> SettingsResult<PathBuf> {
        match home {
            Some(home) => Ok(home.to_path_buf()),
            None => dirs::config_dir()
                .or_else(dirs::home_dir)
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(SettingsError::NoConfigDirectory),
        }
    }

    /// Create the configuration directory if needed
    pub fn ensure_config_dir(dir: &Path) -> SettingsResult<()> {
        std::fs::create_dir_all(dir).map_err(|source| SettingsError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Open the settings under `home`; a missing file yields defaults
    pub fn open(home: Option<&Path>) -> SettingsResult<Self> {
        let path = Self::config_dir(home)?.join(CONFIG_FILE_NAME);
        Self::load_or_default(path)
    }

    /// Load settings from file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Config::load_from_file(path)?;
        tracing::info!(path = %path.display(), "Settings loaded");
        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// Load settings from `path`, or use defaults if it does not exist
    pub fn load_or_default(path: PathBuf) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::info!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::new(path))
        }
    }

    /// Save settings to their file, creating the directory if needed
    pub fn save(&self) -> SettingsResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Self::ensure_config_dir(dir)?;
        }
        self.config.save_to_file(&self.path)?;
        tracing::info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        self.config.validate()
    }
}
