use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

/// Keys accepted by [`Config::set`], in display order.
pub const CONFIG_KEYS: [&str; 6] = [
    "locale",
    "currency",
    "ui_color_enabled",
    "backup_retention",
    "data_root",
    "backup_root",
];

/// Stores user-configurable shell preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the budget document. Defaults to `~/Documents/HomeBudget`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for backups. Defaults to `<data root>/backups`.
    pub backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "cs-CZ".into(),
            currency: "CZK".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            backup_retention: Self::default_backup_retention(),
            data_root: None,
            backup_root: None,
        }
    }
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("HomeBudget")
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        match &self.backup_root {
            Some(path) => path.clone(),
            None => self.resolve_data_root().join("backups"),
        }
    }

    /// Current values as `(key, value)` pairs, unset paths shown as `-`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "-".into())
        };
        vec![
            ("locale", self.locale.clone()),
            ("currency", self.currency.clone()),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            ("backup_retention", self.backup_retention.to_string()),
            ("data_root", path(&self.data_root)),
            ("backup_root", path(&self.backup_root)),
        ]
    }

    /// Updates one preference from its textual form. `-` clears path keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "locale" | "currency" if value.is_empty() => return Err(invalid("cannot be empty")),
            "locale" => self.locale = value.to_string(),
            "currency" => self.currency = value.to_uppercase(),
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected on/off")),
                }
            }
            "backup_retention" => {
                let retention: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if retention == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.backup_retention = retention;
            }
            "data_root" => self.data_root = optional_path(value),
            "backup_root" => self.backup_root = optional_path(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    match value {
        "" | "-" => None,
        path => Some(PathBuf::from(path)),
    }
}
