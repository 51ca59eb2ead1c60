use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::{CoreTypeError, CourseId, FileId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    #[strum(serialize = "file_deleted")]
    FileDeleted,
}

impl AuditEventType {
    pub fn to_db_int(&self) -> u8 {
        match self {
            AuditEventType::FileDeleted => 1,
        }
    }

    pub fn from_db_int(value: u8) -> Result<Self, CoreTypeError> {
        match value {
            1 => Ok(AuditEventType::FileDeleted),
            _ => Err(CoreTypeError::ConversionError(
                "Failed convert to AuditEventType".to_string(),
            )),
        }
    }
}

/// One audit trail entry, written for every file the deletion service removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_id: String,
    pub event_type: AuditEventType,
    pub file_id: FileId,
    pub file_name: String,
    pub actor_id: UserId,
    pub course_id: CourseId,
    pub time_created: DateTime<Utc>,
}
