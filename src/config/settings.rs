//! User settings for Cifra
//!
//! Manages display preferences and the OAuth site URL.

use serde::{Deserialize, Serialize};

use super::paths::CifraPaths;
use crate::error::CifraError;

/// User settings for Cifra
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol shown before amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// How many expenses the dashboard lists before truncating
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Public site URL used as the redirect origin after sign-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    /// Default filter for diagnostic logs (overridden by `CIFRA_LOG`)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_list_limit() -> usize {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            list_limit: default_list_limit(),
            site_url: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &CifraPaths) -> Result<Self, CifraError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| CifraError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                CifraError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CifraPaths) -> Result<(), CifraError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CifraError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CifraError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.list_limit, 10);
        assert!(settings.site_url.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.list_limit = 25;
        settings.site_url = Some("https://cifrafinance.app".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.list_limit, 25);
        assert_eq!(loaded.site_url.as_deref(), Some("https://cifrafinance.app"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"list_limit": 5}"#).unwrap();
        assert_eq!(settings.list_limit, 5);
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.log_filter, "info");
    }
}
