use std::sync::Arc;

use core_types::{Capability, CourseId, UserId};
use sqlx::{Pool, Sqlite};

use crate::database_error::DatabaseError;

#[derive(Debug)]
pub struct CapabilityRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl CapabilityRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub async fn grant(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT OR IGNORE INTO capability_grant (user_id, capability, course_id)
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(capability.to_string())
        .bind(course_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn revoke(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "DELETE FROM capability_grant
             WHERE user_id = ? AND capability = ? AND course_id = ?",
        )
        .bind(user_id)
        .bind(capability.to_string())
        .bind(course_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> Result<bool, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM capability_grant
             WHERE user_id = ? AND capability = ? AND course_id = ?",
        )
        .bind(user_id)
        .bind(capability.to_string())
        .bind(course_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(count > 0)
    }
}
