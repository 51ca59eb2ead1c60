use std::sync::Arc;

use chrono::{TimeZone, Utc};
use core_types::{Capability, CourseId, FileId, ModuleId, Scope, UserId, module_component};

use crate::{
    access_control::mock_access_control::MockAccessControl,
    audit::mock_audit_log::MockAuditLog,
    clock::ManualClock,
    course_catalog::{ModuleRecord, mock_course_catalog::MockCourseCatalog},
    file_areas::FileAreaTable,
    file_deletion::service::FileDeletionService,
    file_storage::mock_file_storage::{MockFileStorage, stored_file},
    reference_resolver::ReferenceResolver,
    reference_rules::ReferenceRuleRegistry,
    report_service::{ReportCollaborators, ReportService},
    skip_filter::SkipFilter,
    unused_file_scanner::UnusedFileScanner,
    usage_analyzer::UsageAnalyzer,
    view_models::Settings,
};

pub const MANAGER_ID: UserId = 2;
pub const STUDENT_ID: UserId = 3;

/// A course with one resource whose main file is `notes.pdf` and an orphaned 3 MB
/// `old_draft.docx` among the course files. `MANAGER_ID` may view and delete.
pub struct TestCourse {
    pub course_id: CourseId,
    pub resource_module_id: ModuleId,
    pub resource_instance_id: i64,
    pub notes_id: FileId,
    pub old_draft_id: FileId,
    pub storage: MockFileStorage,
    pub catalog: MockCourseCatalog,
    pub access: MockAccessControl,
    pub audit: MockAuditLog,
    pub clock: ManualClock,
}

impl TestCourse {
    pub fn notes_and_old_draft() -> Self {
        let course_id = 1;
        let resource_module_id = 10;
        let resource_instance_id = 100;

        let catalog = MockCourseCatalog::new();
        catalog.add_module(
            course_id,
            resource_module_id,
            "resource",
            resource_instance_id,
            "Lecture notes",
        );
        catalog.set_record(
            "resource",
            resource_instance_id,
            ModuleRecord::Resource {
                main_file: Some("notes.pdf".to_string()),
            },
        );

        let storage = MockFileStorage::new();
        let mut notes = stored_file(
            1,
            Scope::Module(resource_module_id),
            &module_component("resource"),
            "content",
            0,
            "notes.pdf",
            524_288,
        );
        notes.mime_type = Some("application/pdf".to_string());
        storage.insert_file(notes);
        let mut old_draft = stored_file(
            2,
            Scope::Course(course_id),
            "course",
            "legacy",
            0,
            "old_draft.docx",
            3_145_728,
        );
        old_draft.mime_type = Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
        );
        storage.insert_file(old_draft);

        let access = MockAccessControl::new();
        access.grant(MANAGER_ID, Capability::View, course_id);
        access.grant(MANAGER_ID, Capability::Delete, course_id);

        Self {
            course_id,
            resource_module_id,
            resource_instance_id,
            notes_id: 1,
            old_draft_id: 2,
            storage,
            catalog,
            access,
            audit: MockAuditLog::new(),
            clock: ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()),
        }
    }

    pub fn resolver(&self) -> Arc<ReferenceResolver> {
        Arc::new(ReferenceResolver::new(
            Arc::new(self.storage.clone()),
            Arc::new(self.catalog.clone()),
            Arc::new(FileAreaTable::default()),
            Arc::new(ReferenceRuleRegistry::default()),
        ))
    }

    pub fn scanner_with_limit(&self, max_files_per_scan: usize) -> Arc<UnusedFileScanner> {
        Arc::new(UnusedFileScanner::new(
            Arc::new(self.storage.clone()),
            self.resolver(),
            Arc::new(SkipFilter::default()),
            max_files_per_scan,
        ))
    }

    pub fn scanner(&self) -> Arc<UnusedFileScanner> {
        self.scanner_with_limit(Settings::default().max_files_per_scan)
    }

    pub fn analyzer(&self) -> UsageAnalyzer {
        UsageAnalyzer::new(
            Arc::new(self.storage.clone()),
            self.resolver(),
            Settings::default().max_files_per_scan,
        )
    }

    pub fn deletion_service(&self) -> FileDeletionService {
        FileDeletionService::new(
            Arc::new(self.storage.clone()),
            Arc::new(self.access.clone()),
            Arc::new(self.audit.clone()),
            self.scanner(),
            Arc::new(self.clock.clone()),
        )
    }

    pub fn collaborators(&self) -> ReportCollaborators {
        ReportCollaborators {
            storage: Arc::new(self.storage.clone()),
            catalog: Arc::new(self.catalog.clone()),
            access: Arc::new(self.access.clone()),
            audit: Arc::new(self.audit.clone()),
        }
    }

    pub fn report_service(&self, settings: Settings) -> ReportService {
        ReportService::new(
            self.collaborators(),
            Arc::new(settings),
            Arc::new(self.clock.clone()),
        )
    }
}
