use core_types::{FileId, StoredFile, events::AuditRecord};
use serde::Serialize;

use crate::unused_file_scanner::FileStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum FileDeletionStatus {
    Pending,
    /// Re-checked against current course content and still unused.
    Verified,
    NotFound,
    NoLongerUnused(FileStatus),
    Deleted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDeletionResult {
    pub file_id: FileId,
    pub file: Option<StoredFile>,
    pub status: FileDeletionStatus,
}

impl FileDeletionResult {
    pub fn new(file_id: FileId) -> Self {
        Self {
            file_id,
            file: None,
            status: FileDeletionStatus::Pending,
        }
    }

    pub fn is_pending_with_file(&self) -> bool {
        self.status == FileDeletionStatus::Pending && self.file.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionFailureReason {
    /// None of the requested files was unused anymore, or none existed.
    NothingUnused,
    /// At least one file could not be checked or deleted.
    StorageFailure,
}

impl std::fmt::Display for DeletionFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionFailureReason::NothingUnused => {
                write!(f, "None of the selected files could be deleted as unused")
            }
            DeletionFailureReason::StorageFailure => {
                write!(f, "The file store reported errors while deleting")
            }
        }
    }
}

/// Tally of one deletion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionOutcome {
    pub attempted: usize,
    pub deleted: usize,
    pub skipped_referenced: usize,
    pub skipped_not_found: usize,
    pub failed: usize,
    pub deleted_file_ids: Vec<FileId>,
    pub errors: Vec<String>,
    pub audit_records: Vec<AuditRecord>,
}

impl DeletionOutcome {
    pub fn from_results(results: &[FileDeletionResult], audit_records: Vec<AuditRecord>) -> Self {
        let mut outcome = Self {
            attempted: results.len(),
            deleted: 0,
            skipped_referenced: 0,
            skipped_not_found: 0,
            failed: 0,
            deleted_file_ids: vec![],
            errors: vec![],
            audit_records,
        };
        for result in results {
            match &result.status {
                FileDeletionStatus::Deleted => {
                    outcome.deleted += 1;
                    outcome.deleted_file_ids.push(result.file_id);
                }
                FileDeletionStatus::NotFound => outcome.skipped_not_found += 1,
                FileDeletionStatus::NoLongerUnused(_) => outcome.skipped_referenced += 1,
                FileDeletionStatus::Failed(message) => {
                    outcome.failed += 1;
                    outcome.errors.push(message.clone());
                }
                // a pipeline that ran to completion leaves nothing pending
                FileDeletionStatus::Pending | FileDeletionStatus::Verified => {
                    outcome.failed += 1;
                    outcome
                        .errors
                        .push(format!("File {} was not processed", result.file_id));
                }
            }
        }
        outcome
    }

    pub fn is_success(&self) -> bool {
        self.deleted > 0
    }

    pub fn failure_reason(&self) -> Option<DeletionFailureReason> {
        if self.is_success() {
            None
        } else if self.failed > 0 {
            Some(DeletionFailureReason::StorageFailure)
        } else {
            Some(DeletionFailureReason::NothingUnused)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(file_id: FileId, status: FileDeletionStatus) -> FileDeletionResult {
        FileDeletionResult {
            status,
            ..FileDeletionResult::new(file_id)
        }
    }

    #[test]
    fn test_outcome_tally_and_failure_reason() {
        let outcome = DeletionOutcome::from_results(
            &[
                result(1, FileDeletionStatus::Deleted),
                result(2, FileDeletionStatus::NotFound),
                result(3, FileDeletionStatus::NoLongerUnused(FileStatus::Referenced)),
                result(4, FileDeletionStatus::Failed("disk".to_string())),
            ],
            vec![],
        );
        assert_eq!(outcome.attempted, 4);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.skipped_not_found, 1);
        assert_eq!(outcome.skipped_referenced, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.deleted_file_ids, vec![1]);
        assert!(outcome.is_success());
        assert_eq!(outcome.failure_reason(), None);

        let outcome = DeletionOutcome::from_results(
            &[result(3, FileDeletionStatus::NoLongerUnused(FileStatus::Referenced))],
            vec![],
        );
        assert_eq!(
            outcome.failure_reason(),
            Some(DeletionFailureReason::NothingUnused)
        );

        let outcome = DeletionOutcome::from_results(
            &[
                result(2, FileDeletionStatus::NotFound),
                result(4, FileDeletionStatus::Failed("disk".to_string())),
            ],
            vec![],
        );
        assert_eq!(
            outcome.failure_reason(),
            Some(DeletionFailureReason::StorageFailure)
        );
    }
}
