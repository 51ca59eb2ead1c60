pub mod db_file_storage;
pub mod mock_file_storage;

use async_trait::async_trait;
use core_types::{FileId, Scope, StoredFile};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    LookupFailed(String),
    DeleteFailed(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::LookupFailed(msg) => write!(f, "File lookup failed: {}", msg),
            StorageError::DeleteFailed(msg) => write!(f, "File delete failed: {}", msg),
        }
    }
}

/// Access to the hosting platform's file store.
///
/// Files are addressed by owning scope, component and file area, optionally narrowed to a
/// single item id. Enumeration results include directory markers.
#[async_trait]
pub trait FileStorageOps: Send + Sync {
    async fn enumerate_files(
        &self,
        scope: Scope,
        component: &str,
        file_area: &str,
        item_id: Option<i64>,
    ) -> Result<Vec<StoredFile>, StorageError>;

    async fn get_file(&self, file_id: FileId) -> Result<Option<StoredFile>, StorageError>;

    /// Returns `false` when the file no longer exists.
    async fn delete_file(&self, file_id: FileId) -> Result<bool, StorageError>;
}
