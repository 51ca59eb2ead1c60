use std::sync::Arc;

use chrono::DateTime;
use core_types::{
    CourseId,
    events::{AuditEventType, AuditRecord},
};
use sqlx::{Pool, Row, Sqlite, prelude::FromRow, sqlite::SqliteRow};

use crate::database_error::DatabaseError;

/// Newtype so `FromRow` can be implemented for the shared audit record type.
struct AuditLogRow(AuditRecord);

impl FromRow<'_, SqliteRow> for AuditLogRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let event_type: u8 = row.try_get("event_type")?;
        let event_type = AuditEventType::from_db_int(event_type)
            .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;
        let time_created: i64 = row.try_get("time_created")?;
        let time_created = DateTime::from_timestamp(time_created, 0).ok_or_else(|| {
            sqlx::Error::Decode(format!("Invalid timestamp {} in DB", time_created).into())
        })?;
        Ok(Self(AuditRecord {
            event_id: row.try_get("event_id")?,
            event_type,
            file_id: row.try_get("file_id")?,
            file_name: row.try_get("file_name")?,
            actor_id: row.try_get("actor_id")?,
            course_id: row.try_get("course_id")?,
            time_created,
        }))
    }
}

#[derive(Debug)]
pub struct AuditLogRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl AuditLogRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn add_log_entry(&self, record: &AuditRecord) -> Result<i64, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO audit_log (
                event_id,
                event_type,
                file_id,
                file_name,
                actor_id,
                course_id,
                time_created
                ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.event_id)
        .bind(record.event_type.to_db_int())
        .bind(record.file_id)
        .bind(&record.file_name)
        .bind(record.actor_id)
        .bind(record.course_id)
        .bind(record.time_created.timestamp())
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_log_entries_by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT event_id, event_type, file_id, file_name, actor_id, course_id, time_created
             FROM audit_log
             WHERE course_id = ?
             ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::setup_test_db;

    use super::*;

    #[async_std::test]
    async fn test_log_entries_by_course() {
        let pool = Arc::new(setup_test_db().await);
        let repository = AuditLogRepository::new(pool);
        let record = AuditRecord {
            event_id: "c4d1e0a2-1".to_string(),
            event_type: AuditEventType::FileDeleted,
            file_id: 44,
            file_name: "old_draft.docx".to_string(),
            actor_id: 2,
            course_id: 9,
            time_created: Utc.with_ymd_and_hms(2025, 5, 2, 10, 0, 0).unwrap(),
        };
        repository.add_log_entry(&record).await.unwrap();
        repository
            .add_log_entry(&AuditRecord {
                event_id: "c4d1e0a2-2".to_string(),
                course_id: 10,
                ..record.clone()
            })
            .await
            .unwrap();

        let entries = repository.get_log_entries_by_course(9).await.unwrap();
        assert_eq!(entries, vec![record]);
    }
}
