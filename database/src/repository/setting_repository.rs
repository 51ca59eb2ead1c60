use std::{collections::HashMap, sync::Arc};

use core_types::SettingName;
use sqlx::{Pool, Row, Sqlite};

use crate::database_error::DatabaseError;

#[derive(Debug)]
pub struct SettingRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SettingRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let rows = sqlx::query("SELECT key, value FROM setting")
            .fetch_all(&*self.pool)
            .await?;
        let mut settings: HashMap<String, String> = HashMap::new();
        for row in rows {
            settings.insert(row.try_get("key")?, row.try_get("value")?);
        }

        Ok(settings)
    }

    pub async fn get_setting(&self, key: &SettingName) -> Result<Option<String>, DatabaseError> {
        let value = sqlx::query_scalar("SELECT value FROM setting WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(value)
    }

    pub async fn add_or_update_setting(
        &self,
        key: &SettingName,
        value: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO setting (key, value)
             VALUES (?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_or_update_settings(
        &self,
        settings: &HashMap<SettingName, String>,
    ) -> Result<(), DatabaseError> {
        for (key, value) in settings {
            self.add_or_update_setting(key, value).await?;
        }
        Ok(())
    }

    pub async fn delete_setting(&self, key: &SettingName) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM setting WHERE key = ?")
            .bind(key.as_str())
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}
