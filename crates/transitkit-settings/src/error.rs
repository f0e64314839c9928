//! Error types for the settings crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading, validating or writing the
/// configuration file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Neither a platform config directory nor a home directory exists.
    #[error("No configuration directory available")]
    NoConfigDirectory,

    #[error("Cannot create configuration directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only `.toml` and `.json` files are understood.
    #[error("Unsupported config format '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration as TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl SettingsError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the file's content rather than by I/O
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSetting { .. } | Self::Json(_) | Self::TomlParse(_)
        )
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::Read {
            path: PathBuf::from("/tmp/config.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Cannot read /tmp/config.toml: not found");

        let err = SettingsError::invalid("history.capacity", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'history.capacity': must be positive"
        );

        let err = SettingsError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format 'yaml'");
    }

    #[test]
    fn test_content_errors() {
        assert!(SettingsError::invalid("world", "empty").is_content_error());
        let parse = toml::from_str::<toml::Table>("[broken").unwrap_err();
        assert!(SettingsError::from(parse).is_content_error());
        assert!(!SettingsError::NoConfigDirectory.is_content_error());
    }
}
