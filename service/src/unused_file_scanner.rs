use std::sync::Arc;

use core_types::{CourseId, FileSize, ModuleInfo, StoredFile};

use crate::{
    content_graph::CourseContentGraph,
    error::Error,
    file_storage::FileStorageOps,
    reference_resolver::ReferenceResolver,
    scan_notice::ScanNotice,
    skip_filter::SkipFilter,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub course_id: CourseId,
    /// Unused files ordered by file name (case insensitive), then id.
    pub files: Vec<StoredFile>,
    /// Modules of the content graph the scan walked.
    pub modules: Vec<ModuleInfo>,
    pub scanned_file_count: usize,
    pub truncated: bool,
    pub notices: Vec<ScanNotice>,
}

impl ScanResult {
    pub fn total_size(&self) -> FileSize {
        self.files.iter().map(|f| f.file_size).sum()
    }

    pub fn module(&self, module_id: i64) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }
}

/// Outcome of checking a single file against the current course content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Unused,
    Referenced,
    /// Matches a skip pattern or an ignored file type.
    Skipped,
    /// Directory marker, or an area the scan does not cover.
    NotScanned,
    NotInCourse,
}

pub struct UnusedFileScanner {
    storage: Arc<dyn FileStorageOps>,
    resolver: Arc<ReferenceResolver>,
    skip_filter: Arc<SkipFilter>,
    max_files_per_scan: usize,
}

impl UnusedFileScanner {
    pub fn new(
        storage: Arc<dyn FileStorageOps>,
        resolver: Arc<ReferenceResolver>,
        skip_filter: Arc<SkipFilter>,
        max_files_per_scan: usize,
    ) -> Self {
        Self {
            storage,
            resolver,
            skip_filter,
            max_files_per_scan,
        }
    }

    pub async fn content_graph(&self, course_id: CourseId) -> Result<CourseContentGraph, Error> {
        self.resolver.content_graph(course_id).await
    }

    pub async fn scan(&self, course_id: CourseId) -> ScanResult {
        tracing::info!(course_id, "Scanning course for unused files");
        let (graph, notice) = self.resolver.content_graph_or_course_only(course_id).await;
        let mut result = self.scan_graph(&graph).await;
        if let Some(notice) = notice {
            result.notices.insert(0, notice);
        }
        result
    }

    /// Enumerates every scanned area of the graph and keeps the files that are neither
    /// referenced, in an unresolved area, nor skipped.
    pub async fn scan_graph(&self, graph: &CourseContentGraph) -> ScanResult {
        let enumerated = graph
            .enumerate_files(self.storage.as_ref(), self.max_files_per_scan)
            .await;
        let resolved = self.resolver.resolve_in(graph).await;
        let scanned_file_count = enumerated.files.len();

        let mut files: Vec<StoredFile> = enumerated
            .files
            .into_iter()
            .filter(|file| {
                !resolved.references.contains(file.id)
                    && !resolved.references.is_unresolved(file.scope, &file.file_area)
                    && !self.skip_filter.is_skipped(file)
            })
            .collect();
        files.sort_by(|a, b| {
            a.file_name
                .to_lowercase()
                .cmp(&b.file_name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });

        let mut notices = enumerated.notices;
        notices.extend(resolved.notices);

        tracing::info!(
            course_id = graph.course_id,
            scanned = scanned_file_count,
            referenced = resolved.references.len(),
            unused = files.len(),
            truncated = enumerated.truncated,
            "Scan complete"
        );

        ScanResult {
            course_id: graph.course_id,
            files,
            modules: graph.modules.iter().map(|m| m.module.clone()).collect(),
            scanned_file_count,
            truncated: enumerated.truncated,
            notices,
        }
    }

    /// Re-evaluates one file against the graph without using any cached scan.
    pub async fn file_status(
        &self,
        graph: &CourseContentGraph,
        file: &StoredFile,
    ) -> Result<FileStatus, Error> {
        if graph.locate(file.scope).is_none() {
            return Ok(FileStatus::NotInCourse);
        }
        if file.is_directory() || !graph.is_scanned(file) {
            return Ok(FileStatus::NotScanned);
        }
        if self.skip_filter.is_skipped(file) {
            return Ok(FileStatus::Skipped);
        }
        if self.resolver.is_referenced(graph, file).await? {
            Ok(FileStatus::Referenced)
        } else {
            Ok(FileStatus::Unused)
        }
    }
}

#[cfg(test)]
mod tests {
    use core_types::{Scope, module_component};

    use super::*;
    use crate::{course_catalog::ModuleRecord, test_fixtures::TestCourse};

    #[async_std::test]
    async fn test_scan_returns_orphaned_course_file() {
        let course = TestCourse::notes_and_old_draft();
        let result = course.scanner().scan(course.course_id).await;

        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx"]);
        assert_eq!(result.total_size(), 3_145_728);
        assert!(!result.truncated);
        assert!(result.notices.is_empty());
    }

    #[async_std::test]
    async fn test_scan_is_disjoint_from_references_and_deterministic() {
        let course = TestCourse::notes_and_old_draft();
        let book = module_component("book");
        course.catalog.add_module(course.course_id, 11, "book", 101, "Handbook");
        course
            .catalog
            .set_record("book", 101, ModuleRecord::Book { chapter_ids: vec![1] });
        course.storage.add_file(Scope::Module(11), &book, "chapter", 1, "Zeta.png", 10);
        course.storage.add_file(Scope::Module(11), &book, "chapter", 2, "alpha.png", 10);
        course.storage.add_file(Scope::Module(11), &book, "chapter", 3, "Beta.png", 10);

        let scanner = course.scanner();
        let first = scanner.scan(course.course_id).await;
        let resolved = course.resolver().resolve_used(course.course_id).await;
        for file in &first.files {
            assert!(!resolved.references.contains(file.id));
        }
        let names: Vec<_> = first.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["alpha.png", "Beta.png", "old_draft.docx"]);

        let second = scanner.scan(course.course_id).await;
        assert_eq!(first, second);
    }

    #[async_std::test]
    async fn test_scan_never_reports_skipped_or_directory_files() {
        let course = TestCourse::notes_and_old_draft();
        for name in [".DS_Store", "Thumbs.db", "course_backup.mbz", "Archive.zip", "."] {
            course
                .storage
                .add_file(Scope::Course(course.course_id), "course", "legacy", 0, name, 10);
        }
        let result = course.scanner().scan(course.course_id).await;
        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx"]);
    }

    #[async_std::test]
    async fn test_scan_excludes_unresolved_areas() {
        let course = TestCourse::notes_and_old_draft();
        let forum = module_component("forum");
        course.catalog.add_module(course.course_id, 12, "forum", 102, "Questions");
        course
            .catalog
            .set_record("forum", 102, ModuleRecord::Forum { post_ids: vec![1] });
        course.storage.add_file(Scope::Module(12), &forum, "post", 1, "answer.png", 10);
        course.storage.add_file(Scope::Module(12), &forum, "attachment", 2, "removed.pdf", 10);

        let result = course.scanner().scan(course.course_id).await;
        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx", "removed.pdf"]);

        course.catalog.fail_record_for("forum", 102);
        let result = course.scanner().scan(course.course_id).await;
        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx"]);
        let unresolved: Vec<_> = result
            .notices
            .iter()
            .filter_map(|notice| match notice {
                ScanNotice::ReferencesUnresolved { file_area, .. } => Some(file_area.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(unresolved, vec!["post", "attachment"]);
    }

    #[async_std::test]
    async fn test_resource_content_files_are_not_reported() {
        let course = TestCourse::notes_and_old_draft();
        let resource = module_component("resource");
        let figure = course.storage.add_file(
            Scope::Module(course.resource_module_id),
            &resource,
            "content",
            0,
            "figure1.png",
            10,
        );

        let result = course.scanner().scan(course.course_id).await;
        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx"]);

        let resolved = course.resolver().resolve_used(course.course_id).await;
        assert!(resolved.references.contains(figure));

        course.catalog.set_record(
            "resource",
            course.resource_instance_id,
            ModuleRecord::Resource { main_file: None },
        );
        let result = course.scanner().scan(course.course_id).await;
        assert_eq!(result.files.len(), 1);
    }

    #[async_std::test]
    async fn test_module_list_failure_degrades_to_course_files() {
        let course = TestCourse::notes_and_old_draft();
        course.catalog.fail_modules_for(course.course_id);
        let result = course.scanner().scan(course.course_id).await;
        let names: Vec<_> = result.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["old_draft.docx"]);
        assert!(result.modules.is_empty());
        assert!(matches!(
            result.notices[0],
            ScanNotice::ModuleListUnavailable { .. }
        ));
    }

    #[async_std::test]
    async fn test_scan_truncates_at_limit() {
        let course = TestCourse::notes_and_old_draft();
        for i in 0..5 {
            course.storage.add_file(
                Scope::Course(course.course_id),
                "course",
                "legacy",
                0,
                &format!("extra_{}.txt", i),
                1,
            );
        }
        let scanner = course.scanner_with_limit(3);
        let result = scanner.scan(course.course_id).await;
        assert!(result.truncated);
        assert_eq!(result.scanned_file_count, 3);
        assert!(result.files.len() <= 3);
        assert!(result.notices.contains(&ScanNotice::Truncated { limit: 3 }));
    }

    #[async_std::test]
    async fn test_file_status() {
        let course = TestCourse::notes_and_old_draft();
        let scanner = course.scanner();
        let graph = scanner.content_graph(course.course_id).await.unwrap();

        let old_draft = course.storage.get_file(course.old_draft_id).await.unwrap().unwrap();
        let notes = course.storage.get_file(course.notes_id).await.unwrap().unwrap();
        assert_eq!(scanner.file_status(&graph, &old_draft).await.unwrap(), FileStatus::Unused);
        assert_eq!(scanner.file_status(&graph, &notes).await.unwrap(), FileStatus::Referenced);

        let foreign = course.storage.add_file(Scope::Course(99), "course", "legacy", 0, "x.doc", 1);
        let foreign = course.storage.get_file(foreign).await.unwrap().unwrap();
        assert_eq!(scanner.file_status(&graph, &foreign).await.unwrap(), FileStatus::NotInCourse);

        let hidden = course
            .storage
            .add_file(Scope::Course(course.course_id), "course", "legacy", 0, ".secret", 1);
        let hidden = course.storage.get_file(hidden).await.unwrap().unwrap();
        assert_eq!(scanner.file_status(&graph, &hidden).await.unwrap(), FileStatus::Skipped);
    }
}
