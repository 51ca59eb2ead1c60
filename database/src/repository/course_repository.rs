use std::sync::Arc;

use core_types::CourseId;
use sqlx::{Pool, Row, Sqlite, prelude::FromRow, sqlite::SqliteRow};

use crate::{
    database_error::DatabaseError,
    models::{Course, CourseModule},
};

impl FromRow<'_, SqliteRow> for Course {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            short_name: row.try_get("short_name")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for CourseModule {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            course_id: row.try_get("course_id")?,
            module_type: row.try_get("module_type")?,
            instance_id: row.try_get("instance_id")?,
            name: row.try_get("name")?,
        })
    }
}

#[derive(Debug)]
pub struct CourseRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl CourseRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn add_course(&self, full_name: &str, short_name: &str) -> Result<CourseId, DatabaseError> {
        let result = sqlx::query("INSERT INTO course (full_name, short_name) VALUES (?, ?)")
            .bind(full_name)
            .bind(short_name)
            .execute(&*self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Option<Course>, DatabaseError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, full_name, short_name FROM course WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(course)
    }

    pub async fn add_course_module(
        &self,
        course_id: CourseId,
        module_type: &str,
        instance_id: i64,
        name: &str,
    ) -> Result<i64, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO course_modules (course_id, module_type, instance_id, name)
             VALUES (?, ?, ?, ?)",
        )
        .bind(course_id)
        .bind(module_type)
        .bind(instance_id)
        .bind(name)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_course_modules(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseModule>, DatabaseError> {
        let modules = sqlx::query_as::<_, CourseModule>(
            "SELECT id, course_id, module_type, instance_id, name
             FROM course_modules
             WHERE course_id = ?
             ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(modules)
    }

    pub async fn delete_course_module(&self, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM course_modules WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}
