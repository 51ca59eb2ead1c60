use std::sync::Arc;

use core_types::{CourseId, FileId, UserId};

use crate::{
    access_control::AccessControlOps,
    audit::AuditOps,
    clock::Clock,
    error::Error,
    file_deletion::{context::DeletionContext, model::DeletionOutcome},
    file_storage::FileStorageOps,
    pipeline::Pipeline,
    unused_file_scanner::UnusedFileScanner,
};

/// Deletes files a user selected from the unused file report, after checking each one is
/// still unused.
pub struct FileDeletionService {
    storage: Arc<dyn FileStorageOps>,
    access: Arc<dyn AccessControlOps>,
    audit: Arc<dyn AuditOps>,
    scanner: Arc<UnusedFileScanner>,
    clock: Arc<dyn Clock>,
}

impl FileDeletionService {
    pub fn new(
        storage: Arc<dyn FileStorageOps>,
        access: Arc<dyn AccessControlOps>,
        audit: Arc<dyn AuditOps>,
        scanner: Arc<UnusedFileScanner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            access,
            audit,
            scanner,
            clock,
        }
    }

    /// Request level problems (missing capability, malformed ids, unreadable course) are
    /// errors; per file problems are tallied in the outcome.
    pub async fn delete_files(
        &self,
        course_id: CourseId,
        file_ids: &[FileId],
        actor_id: UserId,
    ) -> Result<DeletionOutcome, Error> {
        let mut context = DeletionContext {
            course_id,
            actor_id,
            requested_ids: file_ids.to_vec(),
            storage: Arc::clone(&self.storage),
            access: Arc::clone(&self.access),
            audit: Arc::clone(&self.audit),
            scanner: Arc::clone(&self.scanner),
            clock: Arc::clone(&self.clock),
            graph: None,
            deletion_results: vec![],
            audit_records: vec![],
        };

        let pipeline = Pipeline::<DeletionContext>::new();
        pipeline.execute(&mut context).await?;

        let outcome = DeletionOutcome::from_results(&context.deletion_results, context.audit_records);
        tracing::info!(
            course_id,
            actor_id,
            attempted = outcome.attempted,
            deleted = outcome.deleted,
            skipped_referenced = outcome.skipped_referenced,
            skipped_not_found = outcome.skipped_not_found,
            failed = outcome.failed,
            "Deletion complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use core_types::{Scope, events::AuditEventType, module_component};

    use super::*;
    use crate::{
        course_catalog::ModuleRecord,
        file_deletion::model::DeletionFailureReason,
        test_fixtures::{MANAGER_ID, STUDENT_ID, TestCourse},
    };

    #[async_std::test]
    async fn test_delete_unused_file() {
        let course = TestCourse::notes_and_old_draft();
        let service = course.deletion_service();

        let outcome = service
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();

        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.skipped_referenced, 0);
        assert_eq!(outcome.skipped_not_found, 0);
        assert!(outcome.is_success());
        assert!(course.storage.was_deleted(course.old_draft_id));

        let records = course.audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, AuditEventType::FileDeleted);
        assert_eq!(records[0].file_id, course.old_draft_id);
        assert_eq!(records[0].file_name, "old_draft.docx");
        assert_eq!(records[0].actor_id, MANAGER_ID);
        assert_eq!(records[0].time_created, course.clock.now());
        assert_eq!(outcome.audit_records, records);

        let rescan = course.scanner().scan(course.course_id).await;
        assert!(rescan.files.is_empty());
    }

    #[async_std::test]
    async fn test_deleting_again_is_tallied_not_found() {
        let course = TestCourse::notes_and_old_draft();
        let service = course.deletion_service();
        service
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();

        let outcome = service
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.skipped_not_found, 1);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(
            outcome.failure_reason(),
            Some(DeletionFailureReason::NothingUnused)
        );
        assert_eq!(course.audit.record_count(), 1);
    }

    #[async_std::test]
    async fn test_file_removed_before_request_is_not_found() {
        let course = TestCourse::notes_and_old_draft();
        course.storage.remove_file(course.old_draft_id);

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.skipped_not_found, 1);
        assert_eq!(course.storage.delete_call_count(), 0);
    }

    #[async_std::test]
    async fn test_concurrent_delete_is_not_found_and_not_audited() {
        let course = TestCourse::notes_and_old_draft();
        course.storage.vanish_on_delete(course.old_draft_id);

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.skipped_not_found, 1);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(course.audit.record_count(), 0);
    }

    #[async_std::test]
    async fn test_newly_referenced_file_is_kept() {
        let course = TestCourse::notes_and_old_draft();
        let book = module_component("book");
        course.catalog.add_module(course.course_id, 11, "book", 101, "Handbook");
        course
            .catalog
            .set_record("book", 101, ModuleRecord::Book { chapter_ids: vec![1] });
        let figure = course
            .storage
            .add_file(Scope::Module(11), &book, "chapter", 2, "figure.png", 100);
        let scan = course.scanner().scan(course.course_id).await;
        assert!(scan.files.iter().any(|f| f.id == figure));

        // chapter 2 is written after the report was shown
        course.catalog.set_record(
            "book",
            101,
            ModuleRecord::Book {
                chapter_ids: vec![1, 2],
            },
        );

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[figure, course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.skipped_referenced, 1);
        assert_eq!(outcome.deleted, 1);
        assert!(course.storage.contains(figure));
    }

    #[async_std::test]
    async fn test_resource_content_files_are_kept() {
        let course = TestCourse::notes_and_old_draft();
        let resource = module_component("resource");
        let figure = course.storage.add_file(
            Scope::Module(course.resource_module_id),
            &resource,
            "content",
            0,
            "figure1.png",
            100,
        );

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[figure], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.skipped_referenced, 1);
        assert_eq!(outcome.deleted, 0);
        assert!(!course.storage.was_deleted(figure));
        assert_eq!(course.audit.record_count(), 0);
    }

    #[async_std::test]
    async fn test_referenced_and_foreign_files_are_never_deleted() {
        let course = TestCourse::notes_and_old_draft();
        let foreign = course
            .storage
            .add_file(Scope::Course(2), "course", "legacy", 0, "theirs.doc", 10);

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[course.notes_id, foreign, 4242], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.skipped_referenced, 1);
        assert_eq!(outcome.skipped_not_found, 2);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(course.storage.delete_call_count(), 0);
        assert!(course.storage.contains(course.notes_id));
        assert!(course.storage.contains(foreign));
    }

    #[async_std::test]
    async fn test_without_capability_nothing_is_touched() {
        let course = TestCourse::notes_and_old_draft();
        let result = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id], STUDENT_ID)
            .await;

        assert!(matches!(result, Err(Error::NotAuthorized(_))));
        assert_eq!(course.storage.call_count(), 0);
        assert_eq!(course.catalog.call_count(), 0);
        assert_eq!(course.audit.record_count(), 0);
    }

    #[async_std::test]
    async fn test_invalid_requests_are_rejected_before_storage_calls() {
        let course = TestCourse::notes_and_old_draft();
        let service = course.deletion_service();

        let result = service.delete_files(course.course_id, &[], MANAGER_ID).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = service
            .delete_files(course.course_id, &[course.old_draft_id, 0], MANAGER_ID)
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        assert_eq!(course.storage.call_count(), 0);
        assert_eq!(course.catalog.call_count(), 0);
    }

    #[async_std::test]
    async fn test_duplicate_ids_are_collapsed() {
        let course = TestCourse::notes_and_old_draft();
        let outcome = course
            .deletion_service()
            .delete_files(
                course.course_id,
                &[course.old_draft_id, course.old_draft_id],
                MANAGER_ID,
            )
            .await
            .unwrap();
        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(course.storage.delete_call_count(), 1);
    }

    #[async_std::test]
    async fn test_storage_failures_are_per_file() {
        let course = TestCourse::notes_and_old_draft();
        let second = course.storage.add_file(
            Scope::Course(course.course_id),
            "course",
            "legacy",
            0,
            "unused.txt",
            10,
        );
        let third = course.storage.add_file(
            Scope::Course(course.course_id),
            "course",
            "legacy",
            0,
            "also_unused.txt",
            10,
        );
        course.storage.fail_delete_for(course.old_draft_id);
        course.storage.fail_get_for(third);

        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id, second, third], MANAGER_ID)
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.deleted_file_ids, vec![second]);
        // no audit record for the file the store refused to delete
        assert_eq!(course.audit.record_count(), 1);
        assert_eq!(course.audit.records()[0].file_id, second);
    }

    #[async_std::test]
    async fn test_all_failures_report_storage_failure() {
        let course = TestCourse::notes_and_old_draft();
        course.storage.fail_delete_for(course.old_draft_id);
        let outcome = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.failure_reason(),
            Some(DeletionFailureReason::StorageFailure)
        );
    }

    #[async_std::test]
    async fn test_unreadable_course_aborts() {
        let course = TestCourse::notes_and_old_draft();
        course.catalog.fail_modules_for(course.course_id);
        let result = course
            .deletion_service()
            .delete_files(course.course_id, &[course.old_draft_id], MANAGER_ID)
            .await;
        assert!(matches!(result, Err(Error::StorageLookupFailure(_))));
        assert_eq!(course.storage.delete_call_count(), 0);
    }
}
