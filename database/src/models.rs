use chrono::{DateTime, Utc};
use core_types::{CourseId, FileSize, Scope, Sha1Checksum, StoredFile};

/// Row of the `files` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub id: i64,
    pub scope: Scope,
    pub component: String,
    pub file_area: String,
    pub item_id: i64,
    pub file_path: String,
    pub file_name: String,
    pub file_size: FileSize,
    pub mime_type: Option<String>,
    pub content_hash: Sha1Checksum,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

impl From<FileRow> for StoredFile {
    fn from(row: FileRow) -> Self {
        StoredFile {
            id: row.id,
            scope: row.scope,
            component: row.component,
            file_area: row.file_area,
            item_id: row.item_id,
            file_path: row.file_path,
            file_name: row.file_name,
            file_size: row.file_size,
            mime_type: row.mime_type,
            content_hash: row.content_hash,
            time_created: row.time_created,
            time_modified: row.time_modified,
        }
    }
}

pub struct AddStoredFileParams<'a> {
    pub scope: Scope,
    pub component: &'a str,
    pub file_area: &'a str,
    pub item_id: i64,
    pub file_path: &'a str,
    pub file_name: &'a str,
    pub file_size: FileSize,
    pub mime_type: Option<&'a str>,
    pub content_hash: &'a Sha1Checksum,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub full_name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    pub id: i64,
    pub course_id: CourseId,
    pub module_type: String,
    pub instance_id: i64,
    pub name: String,
}
