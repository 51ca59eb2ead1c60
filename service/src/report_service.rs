use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use core_types::{Capability, CourseId, FileId, Scope, StoredFile, UserId};
use utils::file_util::format_file_size;

use crate::{
    access_control::AccessControlOps,
    audit::AuditOps,
    clock::Clock,
    course_catalog::CourseCatalogOps,
    error::Error,
    file_deletion::{model::DeletionOutcome, service::FileDeletionService},
    file_storage::FileStorageOps,
    reference_resolver::ReferenceResolver,
    reference_rules::ReferenceRuleRegistry,
    scan_cache::{DEFAULT_CACHE_CAPACITY, TtlCache},
    skip_filter::SkipFilter,
    unused_file_scanner::{ScanResult, UnusedFileScanner},
    usage_analyzer::{FileUsage, StorageStats, UsageAnalysis, UsageAnalyzer},
    view_models::{ScanReport, ScanSummary, Settings, UnusedFileViewModel},
};

pub const COURSE_LOCATION: &str = "Course";
pub const COURSE_FILES_LABEL: &str = "Course files";

/// Platform services the report needs.
#[derive(Clone)]
pub struct ReportCollaborators {
    pub storage: Arc<dyn FileStorageOps>,
    pub catalog: Arc<dyn CourseCatalogOps>,
    pub access: Arc<dyn AccessControlOps>,
    pub audit: Arc<dyn AuditOps>,
}

/// Entry point for callers: cached scan reports and summaries, usage analysis and deletion
/// requests, all governed by the report settings.
pub struct ReportService {
    settings: Arc<Settings>,
    access: Arc<dyn AccessControlOps>,
    scanner: Arc<UnusedFileScanner>,
    analyzer: UsageAnalyzer,
    deletion: FileDeletionService,
    clock: Arc<dyn Clock>,
    scan_cache: TtlCache<CourseId, ScanReport>,
    analysis_cache: TtlCache<CourseId, UsageAnalysis>,
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ReportService {
    pub fn new(
        collaborators: ReportCollaborators,
        settings: Arc<Settings>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let resolver = Arc::new(ReferenceResolver::new(
            Arc::clone(&collaborators.storage),
            Arc::clone(&collaborators.catalog),
            Arc::new(settings.file_areas.clone()),
            Arc::new(ReferenceRuleRegistry::default()),
        ));
        let scanner = Arc::new(UnusedFileScanner::new(
            Arc::clone(&collaborators.storage),
            Arc::clone(&resolver),
            Arc::new(SkipFilter::from_settings(&settings)),
            settings.max_files_per_scan,
        ));
        let analyzer = UsageAnalyzer::new(
            Arc::clone(&collaborators.storage),
            resolver,
            settings.max_files_per_scan,
        );
        let deletion = FileDeletionService::new(
            collaborators.storage,
            Arc::clone(&collaborators.access),
            collaborators.audit,
            Arc::clone(&scanner),
            Arc::clone(&clock),
        );
        let ttl = Duration::try_seconds(settings.cache_ttl_seconds).unwrap_or(Duration::MAX);
        Self {
            scan_cache: TtlCache::new(Arc::clone(&clock), ttl, DEFAULT_CACHE_CAPACITY),
            analysis_cache: TtlCache::new(Arc::clone(&clock), ttl, DEFAULT_CACHE_CAPACITY),
            settings,
            access: collaborators.access,
            scanner,
            analyzer,
            deletion,
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn can_view(&self, user_id: UserId, course_id: CourseId) -> bool {
        self.access
            .has_capability(user_id, Capability::View, course_id)
            .await
    }

    pub async fn can_delete(&self, user_id: UserId, course_id: CourseId) -> bool {
        self.settings.allow_deletion
            && self
                .access
                .has_capability(user_id, Capability::Delete, course_id)
                .await
    }

    fn ensure_enabled(&self) -> Result<(), Error> {
        if self.settings.enabled {
            Ok(())
        } else {
            Err(Error::ReportDisabled)
        }
    }

    pub async fn get_scan_result(&self, course_id: CourseId) -> Result<Arc<ScanReport>, Error> {
        self.ensure_enabled()?;
        if let Some(report) = self.scan_cache.get(&course_id) {
            tracing::debug!(course_id, "Serving cached scan");
            return Ok(report);
        }
        let result = self.scanner.scan(course_id).await;
        let report = self.build_report(result);
        Ok(self.scan_cache.insert(course_id, report))
    }

    pub async fn get_summary(&self, course_id: CourseId) -> Result<ScanSummary, Error> {
        let report = self.get_scan_result(course_id).await?;
        let total_size = report.entries.iter().map(|e| e.file_size).sum();
        let affected_locations: HashSet<Scope> = report.entries.iter().map(|e| e.scope).collect();
        Ok(ScanSummary {
            total_count: report.entries.len(),
            total_size,
            total_size_formatted: format_file_size(total_size),
            affected_location_count: affected_locations.len(),
            has_unused_files: !report.entries.is_empty(),
        })
    }

    /// Deletes the selected files. When at least one file was removed the course's cached
    /// scan and analysis are dropped.
    pub async fn request_deletion(
        &self,
        course_id: CourseId,
        file_ids: &[FileId],
        actor_id: UserId,
    ) -> Result<DeletionOutcome, Error> {
        self.ensure_enabled()?;
        if !self.settings.allow_deletion {
            return Err(Error::DeletionDisabled);
        }
        let outcome = self
            .deletion
            .delete_files(course_id, file_ids, actor_id)
            .await?;
        if outcome.deleted > 0 {
            self.clear_cache(Some(course_id));
        }
        Ok(outcome)
    }

    pub async fn get_analysis(&self, course_id: CourseId) -> Result<Arc<UsageAnalysis>, Error> {
        self.ensure_enabled()?;
        if let Some(analysis) = self.analysis_cache.get(&course_id) {
            return Ok(analysis);
        }
        let analysis = self.analyzer.analyze(course_id).await;
        Ok(self.analysis_cache.insert(course_id, analysis))
    }

    pub async fn get_storage_stats(&self, course_id: CourseId) -> Result<StorageStats, Error> {
        let analysis = self.get_analysis(course_id).await?;
        Ok(StorageStats::from(analysis.as_ref()))
    }

    pub async fn get_file_usage(
        &self,
        course_id: CourseId,
        file_id: FileId,
    ) -> Result<Option<FileUsage>, Error> {
        self.ensure_enabled()?;
        self.analyzer.file_usage(course_id, file_id).await
    }

    /// `None` clears every course.
    pub fn clear_cache(&self, course_id: Option<CourseId>) {
        match course_id {
            Some(course_id) => {
                self.scan_cache.invalidate(&course_id);
                self.analysis_cache.invalidate(&course_id);
            }
            None => {
                self.scan_cache.clear();
                self.analysis_cache.clear();
            }
        }
        tracing::debug!(?course_id, "Cleared report cache");
    }

    fn build_report(&self, result: ScanResult) -> ScanReport {
        let entries = result
            .files
            .iter()
            .map(|file| self.entry_view_model(&result, file))
            .collect();
        ScanReport {
            course_id: result.course_id,
            entries,
            scanned_file_count: result.scanned_file_count,
            truncated: result.truncated,
            notices: result.notices.iter().map(ToString::to_string).collect(),
            scanned_at: self.clock.now(),
        }
    }

    fn entry_view_model(&self, result: &ScanResult, file: &StoredFile) -> UnusedFileViewModel {
        let (location, activity_type) = match file.scope {
            Scope::Course(_) => (COURSE_LOCATION.to_string(), COURSE_FILES_LABEL.to_string()),
            Scope::Module(module_id) => match result.module(module_id) {
                Some(module) => (module.display_name.clone(), capitalize(&module.module_type)),
                None => (format!("Module {}", module_id), "Unknown".to_string()),
            },
        };
        UnusedFileViewModel {
            file_id: file.id,
            file_name: file.file_name.clone(),
            file_path: file.file_path.clone(),
            file_size: file.file_size,
            file_size_formatted: format_file_size(file.file_size),
            mime_type: file.mime_type.clone(),
            scope: file.scope,
            location,
            activity_type,
            file_area: file.file_area.clone(),
            time_created: file.time_created,
            is_large: file.file_size >= self.settings.file_size_threshold,
        }
    }
}
