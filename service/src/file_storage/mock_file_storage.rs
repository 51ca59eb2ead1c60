use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use core_types::{FileId, FileSize, Scope, StoredFile};
use utils::file_util::get_sha1;

use crate::file_storage::{FileStorageOps, StorageError};

/// Internal state for MockFileStorage
#[derive(Default)]
struct MockState {
    next_file_id: FileId,
    files: BTreeMap<FileId, StoredFile>,
    deleted_files: Vec<FileId>,
    fail_enumerate_for: HashSet<String>,
    fail_get_for: HashSet<FileId>,
    fail_delete_for: HashSet<FileId>,
    vanish_on_delete: HashSet<FileId>,
    enumerate_calls: usize,
    get_calls: usize,
    delete_calls: usize,
}

/// Mock implementation of FileStorageOps for testing
///
/// This mock allows you to:
/// - Populate the file store with files in any scope and file area
/// - Simulate lookup and delete failures per file area or file id
/// - Simulate files disappearing between a scan and a deletion
/// - Verify which storage calls were made
#[derive(Clone)]
pub struct MockFileStorage {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a stored file with fixed timestamps, hashing the file name as its content.
pub fn stored_file(
    id: FileId,
    scope: Scope,
    component: &str,
    file_area: &str,
    item_id: i64,
    file_name: &str,
    file_size: FileSize,
) -> StoredFile {
    let time = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    StoredFile {
        id,
        scope,
        component: component.to_string(),
        file_area: file_area.to_string(),
        item_id,
        file_path: "/".to_string(),
        file_name: file_name.to_string(),
        file_size,
        mime_type: None,
        content_hash: get_sha1(file_name.as_bytes()),
        time_created: time,
        time_modified: time,
    }
}

impl MockFileStorage {
    /// Create a new, empty mock file store
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_file_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Add a file and return its generated id
    pub fn add_file(
        &self,
        scope: Scope,
        component: &str,
        file_area: &str,
        item_id: i64,
        file_name: &str,
        file_size: FileSize,
    ) -> FileId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_file_id;
        state.next_file_id += 1;
        state.files.insert(
            id,
            stored_file(id, scope, component, file_area, item_id, file_name, file_size),
        );
        id
    }

    /// Add a fully specified file, keeping its id
    pub fn insert_file(&self, file: StoredFile) {
        let mut state = self.state.lock().unwrap();
        state.next_file_id = state.next_file_id.max(file.id + 1);
        state.files.insert(file.id, file);
    }

    /// Remove a file behind the caller's back, as a concurrent process would
    pub fn remove_file(&self, file_id: FileId) {
        self.state.lock().unwrap().files.remove(&file_id);
    }

    /// Make enumerate_files fail for a file area
    pub fn fail_enumerate_for(&self, file_area: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .fail_enumerate_for
            .insert(file_area.into());
    }

    /// Make get_file fail for a file id
    pub fn fail_get_for(&self, file_id: FileId) {
        self.state.lock().unwrap().fail_get_for.insert(file_id);
    }

    /// Make delete_file fail for a file id
    pub fn fail_delete_for(&self, file_id: FileId) {
        self.state.lock().unwrap().fail_delete_for.insert(file_id);
    }

    /// Make the file disappear right before delete_file runs, as if another request removed it
    pub fn vanish_on_delete(&self, file_id: FileId) {
        self.state.lock().unwrap().vanish_on_delete.insert(file_id);
    }

    pub fn contains(&self, file_id: FileId) -> bool {
        self.state.lock().unwrap().files.contains_key(&file_id)
    }

    pub fn was_deleted(&self, file_id: FileId) -> bool {
        self.state.lock().unwrap().deleted_files.contains(&file_id)
    }

    pub fn deleted_files(&self) -> Vec<FileId> {
        self.state.lock().unwrap().deleted_files.clone()
    }

    /// Total number of storage calls of any kind
    pub fn call_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.enumerate_calls + state.get_calls + state.delete_calls
    }

    pub fn delete_call_count(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }
}

#[async_trait]
impl FileStorageOps for MockFileStorage {
    async fn enumerate_files(
        &self,
        scope: Scope,
        component: &str,
        file_area: &str,
        item_id: Option<i64>,
    ) -> Result<Vec<StoredFile>, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.enumerate_calls += 1;
        if state.fail_enumerate_for.contains(file_area) {
            return Err(StorageError::LookupFailed(format!(
                "Mock enumerate failure for area {}",
                file_area
            )));
        }
        let mut files: Vec<StoredFile> = state
            .files
            .values()
            .filter(|f| {
                f.scope == scope
                    && f.component == component
                    && f.file_area == file_area
                    && item_id.is_none_or(|item_id| f.item_id == item_id)
            })
            .cloned()
            .collect();
        files.sort_by(|a, b| {
            (a.item_id, &a.file_path, &a.file_name, a.id)
                .cmp(&(b.item_id, &b.file_path, &b.file_name, b.id))
        });
        Ok(files)
    }

    async fn get_file(&self, file_id: FileId) -> Result<Option<StoredFile>, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.get_calls += 1;
        if state.fail_get_for.contains(&file_id) {
            return Err(StorageError::LookupFailed(format!(
                "Mock get failure for file {}",
                file_id
            )));
        }
        Ok(state.files.get(&file_id).cloned())
    }

    async fn delete_file(&self, file_id: FileId) -> Result<bool, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if state.fail_delete_for.contains(&file_id) {
            return Err(StorageError::DeleteFailed(format!(
                "Mock delete failure for file {}",
                file_id
            )));
        }
        if state.vanish_on_delete.remove(&file_id) {
            state.files.remove(&file_id);
            return Ok(false);
        }
        match state.files.remove(&file_id) {
            Some(_) => {
                state.deleted_files.push(file_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
