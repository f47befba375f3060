use budget_config::{Config, ConfigError, ConfigManager};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(cfg.backup_retention >= 1);
    assert!(cfg.resolve_backup_root().starts_with(cfg.resolve_data_root()));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.load().expect("load defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.set("currency", "eur").expect("set currency");
    cfg.set("data_root", "/tmp/budget").expect("set data root");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.currency, "EUR");
    assert_eq!(loaded.resolve_data_root(), PathBuf::from("/tmp/budget"));
    assert!(manager.config_path().exists());
}

#[test]
fn set_rejects_unknown_keys_and_bad_values() {
    let mut cfg = Config::default();
    assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
    assert!(matches!(
        cfg.set("backup_retention", "0"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(cfg.set("ui_color_enabled", "maybe").is_err());

    cfg.set("ui_color_enabled", "off").expect("toggle colour");
    assert!(!cfg.ui_color_enabled);
    cfg.set("backup_root", "-").expect("clear path");
    assert!(cfg.backup_root.is_none());
}

#[test]
fn missing_optional_fields_fall_back_to_defaults() {
    let cfg: Config =
        serde_json::from_str(r#"{"locale": "en-US", "currency": "USD"}"#).expect("parse");
    assert!(cfg.ui_color_enabled);
    assert_eq!(cfg.backup_retention, Config::default_backup_retention());
}
