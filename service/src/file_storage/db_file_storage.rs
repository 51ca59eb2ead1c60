use std::sync::Arc;

use async_trait::async_trait;
use core_types::{FileId, Scope, StoredFile};
use database::repository_manager::RepositoryManager;

use crate::file_storage::{FileStorageOps, StorageError};

/// File store backed by the `files` table.
#[derive(Debug)]
pub struct DbFileStorage {
    repository_manager: Arc<RepositoryManager>,
}

impl DbFileStorage {
    pub fn new(repository_manager: Arc<RepositoryManager>) -> Self {
        Self { repository_manager }
    }
}

#[async_trait]
impl FileStorageOps for DbFileStorage {
    async fn enumerate_files(
        &self,
        scope: Scope,
        component: &str,
        file_area: &str,
        item_id: Option<i64>,
    ) -> Result<Vec<StoredFile>, StorageError> {
        let rows = self
            .repository_manager
            .get_stored_file_repository()
            .get_files_by_area(scope, component, file_area, item_id)
            .await
            .map_err(|e| {
                StorageError::LookupFailed(format!(
                    "{} {}/{}: {}",
                    scope, component, file_area, e
                ))
            })?;
        Ok(rows.into_iter().map(StoredFile::from).collect())
    }

    async fn get_file(&self, file_id: FileId) -> Result<Option<StoredFile>, StorageError> {
        let row = self
            .repository_manager
            .get_stored_file_repository()
            .get_file(file_id)
            .await
            .map_err(|e| StorageError::LookupFailed(format!("file {}: {}", file_id, e)))?;
        Ok(row.map(StoredFile::from))
    }

    async fn delete_file(&self, file_id: FileId) -> Result<bool, StorageError> {
        self.repository_manager
            .get_stored_file_repository()
            .delete_file(file_id)
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("file {}: {}", file_id, e)))
    }
}
