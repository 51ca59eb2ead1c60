use std::sync::Arc;

use chrono::{DateTime, Utc};
use core_types::{FileId, Scope, Sha1Checksum};
use sqlx::{Pool, QueryBuilder, Row, Sqlite, prelude::FromRow, sqlite::SqliteRow};

use crate::{
    database_error::DatabaseError,
    models::{AddStoredFileParams, FileRow},
};

const FILE_COLUMNS: &str = "id, scope_kind, scope_id, component, file_area, item_id, file_path,
     file_name, file_size, mime_type, content_hash, time_created, time_modified";

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| decode_error(format!("Invalid timestamp {} in DB", seconds)))
}

impl FromRow<'_, SqliteRow> for FileRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let scope_kind: u8 = row.try_get("scope_kind")?;
        let scope_id: i64 = row.try_get("scope_id")?;
        let scope = Scope::from_db(scope_kind, scope_id).map_err(|e| decode_error(e.to_string()))?;
        let content_hash: Vec<u8> = row.try_get("content_hash")?;
        let content_hash: Sha1Checksum = content_hash
            .try_into()
            .map_err(|_| decode_error("Invalid SHA1 checksum length in DB".to_string()))?;
        let file_size: i64 = row.try_get("file_size")?;
        Ok(Self {
            id: row.try_get("id")?,
            scope,
            component: row.try_get("component")?,
            file_area: row.try_get("file_area")?,
            item_id: row.try_get("item_id")?,
            file_path: row.try_get("file_path")?,
            file_name: row.try_get("file_name")?,
            file_size: file_size.max(0) as u64,
            mime_type: row.try_get("mime_type")?,
            content_hash,
            time_created: timestamp(row.try_get("time_created")?)?,
            time_modified: timestamp(row.try_get("time_modified")?)?,
        })
    }
}

#[derive(Debug)]
pub struct StoredFileRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl StoredFileRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn add_file(&self, params: &AddStoredFileParams<'_>) -> Result<FileId, DatabaseError> {
        let file_size = i64::try_from(params.file_size)
            .map_err(|_| DatabaseError::InvalidData("File size out of range".to_string()))?;
        let created = params.time_created.timestamp();
        let result = sqlx::query(
            "INSERT INTO files (
                scope_kind,
                scope_id,
                component,
                file_area,
                item_id,
                file_path,
                file_name,
                file_size,
                mime_type,
                content_hash,
                time_created,
                time_modified
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.scope.kind_to_db_int())
        .bind(params.scope.id())
        .bind(params.component)
        .bind(params.file_area)
        .bind(params.item_id)
        .bind(params.file_path)
        .bind(params.file_name)
        .bind(file_size)
        .bind(params.mime_type)
        .bind(params.content_hash.to_vec())
        .bind(created)
        .bind(created)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Files of one file area, optionally narrowed to a single item id.
    ///
    /// Directory markers are included; callers decide whether to skip them.
    pub async fn get_files_by_area(
        &self,
        scope: Scope,
        component: &str,
        file_area: &str,
        item_id: Option<i64>,
    ) -> Result<Vec<FileRow>, DatabaseError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM files WHERE scope_kind = ",
            FILE_COLUMNS
        ));
        query_builder.push_bind(scope.kind_to_db_int());
        query_builder.push(" AND scope_id = ");
        query_builder.push_bind(scope.id());
        query_builder.push(" AND component = ");
        query_builder.push_bind(component);
        query_builder.push(" AND file_area = ");
        query_builder.push_bind(file_area);
        if let Some(item_id) = item_id {
            query_builder.push(" AND item_id = ");
            query_builder.push_bind(item_id);
        }
        query_builder.push(" ORDER BY item_id, file_path, file_name, id");

        let files = query_builder
            .build_query_as::<FileRow>()
            .fetch_all(&*self.pool)
            .await?;
        Ok(files)
    }

    pub async fn get_file(&self, id: FileId) -> Result<Option<FileRow>, DatabaseError> {
        let file = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {} FROM files WHERE id = ?",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(file)
    }

    /// Returns `true` when a row was removed, `false` when the file did not exist (anymore).
    pub async fn delete_file(&self, id: FileId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::setup_test_db;

    use super::*;

    fn params<'a>(
        scope: Scope,
        file_area: &'a str,
        item_id: i64,
        file_name: &'a str,
        content_hash: &'a Sha1Checksum,
    ) -> AddStoredFileParams<'a> {
        AddStoredFileParams {
            scope,
            component: "mod_book",
            file_area,
            item_id,
            file_path: "/",
            file_name,
            file_size: 1234,
            mime_type: Some("application/pdf"),
            content_hash,
            time_created: Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap(),
        }
    }

    #[async_std::test]
    async fn test_add_and_get_file() {
        let pool = Arc::new(setup_test_db().await);
        let repository = StoredFileRepository::new(pool);
        let checksum: Sha1Checksum = [7; 20];

        let id = repository
            .add_file(&params(Scope::Module(3), "chapter", 11, "intro.pdf", &checksum))
            .await
            .unwrap();

        let file = repository.get_file(id).await.unwrap().unwrap();
        assert_eq!(file.scope, Scope::Module(3));
        assert_eq!(file.file_area, "chapter");
        assert_eq!(file.item_id, 11);
        assert_eq!(file.file_name, "intro.pdf");
        assert_eq!(file.file_size, 1234);
        assert_eq!(file.content_hash, checksum);
        assert_eq!(file.time_created, file.time_modified);

        assert!(repository.get_file(id + 100).await.unwrap().is_none());
    }

    #[async_std::test]
    async fn test_get_files_by_area_filters_scope_area_and_item() {
        let pool = Arc::new(setup_test_db().await);
        let repository = StoredFileRepository::new(pool);
        let checksum: Sha1Checksum = [1; 20];

        for (scope, area, item_id, name) in [
            (Scope::Module(3), "chapter", 1, "b.png"),
            (Scope::Module(3), "chapter", 1, "a.png"),
            (Scope::Module(3), "chapter", 2, "c.png"),
            (Scope::Module(3), "intro", 0, "d.png"),
            (Scope::Module(4), "chapter", 1, "e.png"),
            (Scope::Course(3), "chapter", 1, "f.png"),
        ] {
            repository
                .add_file(&params(scope, area, item_id, name, &checksum))
                .await
                .unwrap();
        }

        let all_chapter_files = repository
            .get_files_by_area(Scope::Module(3), "mod_book", "chapter", None)
            .await
            .unwrap();
        let names: Vec<_> = all_chapter_files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);

        let item_files = repository
            .get_files_by_area(Scope::Module(3), "mod_book", "chapter", Some(2))
            .await
            .unwrap();
        assert_eq!(item_files.len(), 1);
        assert_eq!(item_files[0].file_name, "c.png");

        let missing_area = repository
            .get_files_by_area(Scope::Module(3), "mod_book", "submission_files", None)
            .await
            .unwrap();
        assert!(missing_area.is_empty());
    }

    #[async_std::test]
    async fn test_delete_file_reports_whether_row_was_removed() {
        let pool = Arc::new(setup_test_db().await);
        let repository = StoredFileRepository::new(pool);
        let checksum: Sha1Checksum = [2; 20];
        let id = repository
            .add_file(&params(Scope::Module(1), "intro", 0, "x.txt", &checksum))
            .await
            .unwrap();

        assert!(repository.delete_file(id).await.unwrap());
        assert!(!repository.delete_file(id).await.unwrap());
        assert!(repository.get_file(id).await.unwrap().is_none());
    }
}
