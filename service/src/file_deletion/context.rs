use std::sync::Arc;

use core_types::{CourseId, FileId, UserId, events::AuditRecord};

use crate::{
    access_control::AccessControlOps, audit::AuditOps, clock::Clock,
    content_graph::CourseContentGraph, file_deletion::model::FileDeletionResult,
    file_storage::FileStorageOps, unused_file_scanner::UnusedFileScanner,
};

/// State flowing through the deletion pipeline.
pub struct DeletionContext {
    pub course_id: CourseId,
    pub actor_id: UserId,
    pub requested_ids: Vec<FileId>,
    pub storage: Arc<dyn FileStorageOps>,
    pub access: Arc<dyn AccessControlOps>,
    pub audit: Arc<dyn AuditOps>,
    pub scanner: Arc<UnusedFileScanner>,
    pub clock: Arc<dyn Clock>,

    pub graph: Option<CourseContentGraph>,
    /// One entry per distinct requested id, in request order.
    pub deletion_results: Vec<FileDeletionResult>,
    pub audit_records: Vec<AuditRecord>,
}
