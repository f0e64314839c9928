use std::fs;

use tempfile::TempDir;
use transitkit_settings::{Config, SettingsError, SettingsPersistence, Theme};

#[test]
fn test_open_missing_file_gives_defaults() {
    let home = TempDir::new().unwrap();
    let persistence = SettingsPersistence::open(Some(home.path())).unwrap();
    assert_eq!(persistence.config(), &Config::default());
    assert_eq!(persistence.path(), home.path().join("config.toml"));
}

#[test]
fn test_save_and_reload_toml() {
    let home = TempDir::new().unwrap();
    let nested = home.path().join("nested");
    let mut persistence = SettingsPersistence::open(Some(&nested)).unwrap();
    persistence.config_mut().ui.theme = Theme::Light;
    persistence.config_mut().history.capacity = 42;
    persistence.save().unwrap();

    let reloaded = SettingsPersistence::open(Some(&nested)).unwrap();
    assert_eq!(reloaded.config(), persistence.config());
}

#[test]
fn test_save_and_reload_json() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("settings.json");
    let mut persistence = SettingsPersistence::new(&path);
    persistence.config_mut().world.default_columns = 3;
    persistence.save().unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"default_columns\": 3"));

    let reloaded = SettingsPersistence::load_from_file(&path).unwrap();
    assert_eq!(reloaded.config().world.default_columns, 3);
}

#[test]
fn test_unreadable_config_is_an_error() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "[history\ncapacity = ").unwrap();
    let err = SettingsPersistence::open(Some(home.path())).unwrap_err();
    assert!(matches!(err, SettingsError::TomlParse(_)));
}

#[test]
fn test_invalid_values_are_rejected_on_load_and_save() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "[history]\ncapacity = 0\n").unwrap();
    assert!(matches!(
        SettingsPersistence::open(Some(home.path())),
        Err(SettingsError::InvalidSetting { .. })
    ));

    let mut persistence = SettingsPersistence::new(home.path().join("other.toml"));
    persistence.config_mut().world.default_rows = 0;
    assert!(persistence.save().is_err());
    assert!(!home.path().join("other.toml").exists());
}
