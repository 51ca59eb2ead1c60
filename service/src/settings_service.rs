use std::sync::Arc;

use core_types::SettingName;
use database::repository_manager::RepositoryManager;

use crate::{error::Error, view_models::Settings};

/// Loads and stores the report settings kept in the settings table.
#[derive(Debug)]
pub struct SettingsService {
    repository_manager: Arc<RepositoryManager>,
}

impl SettingsService {
    pub fn new(repository_manager: Arc<RepositoryManager>) -> Self {
        Self { repository_manager }
    }

    /// Missing or malformed values fall back to their defaults.
    pub async fn load_settings(&self) -> Result<Settings, Error> {
        let settings_map = self
            .repository_manager
            .get_settings_repository()
            .get_settings()
            .await
            .map_err(|e| Error::DbError(format!("Failed to load settings: {}", e)))?;

        Ok(Settings::from(settings_map))
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), Error> {
        let settings_map = settings
            .to_setting_map()
            .map_err(|e| Error::SettingsError(format!("Failed to serialize settings: {}", e)))?;

        self.repository_manager
            .get_settings_repository()
            .add_or_update_settings(&settings_map)
            .await
            .map_err(|e| Error::DbError(format!("Failed to save settings: {}", e)))?;

        tracing::info!(count = settings_map.len(), "Saved settings");
        Ok(())
    }

    /// Stores a single raw value, e.g. from the command line. Unknown keys are rejected.
    pub async fn save_setting(&self, key: &str, value: &str) -> Result<(), Error> {
        let name = SettingName::from_key(key)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown setting '{}'", key)))?;

        self.repository_manager
            .get_settings_repository()
            .add_or_update_setting(&name, value)
            .await
            .map_err(|e| Error::DbError(format!("Failed to save setting {}: {}", key, e)))
    }

    pub async fn reset_setting(&self, key: &str) -> Result<(), Error> {
        let name = SettingName::from_key(key)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown setting '{}'", key)))?;

        self.repository_manager
            .get_settings_repository()
            .delete_setting(&name)
            .await
            .map_err(|e| Error::DbError(format!("Failed to reset setting {}: {}", key, e)))
    }
}
