use std::collections::BTreeMap;
use std::sync::Arc;

use core_types::{CourseId, FileId, FileSize, ModuleId, ModuleInfo, Scope, StoredFile};
use serde::Serialize;
use utils::file_util::format_file_size;

use crate::{
    content_graph::Location, error::Error, file_storage::FileStorageOps,
    reference_resolver::ReferenceResolver, scan_notice::ScanNotice,
};

pub const LARGEST_FILES_LIMIT: usize = 10;
pub const NO_EXTENSION: &str = "(none)";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtensionUsage {
    pub count: usize,
    pub total_size: FileSize,
    /// First mime type seen for the extension.
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaUsage {
    pub count: usize,
    pub total_size: FileSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleUsage {
    pub module_id: ModuleId,
    pub module_type: String,
    pub display_name: String,
    pub file_count: usize,
    pub total_size: FileSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageAnalysis {
    pub course_id: CourseId,
    pub total_files: usize,
    pub total_size: FileSize,
    pub by_extension: BTreeMap<String, ExtensionUsage>,
    /// Keyed by `component/file_area`.
    pub by_area: BTreeMap<String, AreaUsage>,
    /// Every module of the course in catalog order, including modules without files.
    pub by_module: Vec<ModuleUsage>,
    pub largest_files: Vec<StoredFile>,
    pub truncated: bool,
    pub notices: Vec<ScanNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageStats {
    pub total_files: usize,
    pub total_size: FileSize,
    pub total_size_formatted: String,
    pub average_file_size: FileSize,
    pub average_file_size_formatted: String,
    pub file_type_count: usize,
    pub largest_files: Vec<StoredFile>,
}

impl From<&UsageAnalysis> for StorageStats {
    fn from(analysis: &UsageAnalysis) -> Self {
        let average_file_size = if analysis.total_files == 0 {
            0
        } else {
            analysis.total_size / analysis.total_files as FileSize
        };
        Self {
            total_files: analysis.total_files,
            total_size: analysis.total_size,
            total_size_formatted: format_file_size(analysis.total_size),
            average_file_size,
            average_file_size_formatted: format_file_size(average_file_size),
            file_type_count: analysis.by_extension.len(),
            largest_files: analysis.largest_files.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileUsage {
    pub file: StoredFile,
    pub file_size_formatted: String,
    /// `None` for course level files.
    pub module: Option<ModuleInfo>,
    pub is_referenced: bool,
}

/// Aggregate storage statistics of a course. Walks the same areas as the unused file scan.
pub struct UsageAnalyzer {
    storage: Arc<dyn FileStorageOps>,
    resolver: Arc<ReferenceResolver>,
    max_files: usize,
}

impl UsageAnalyzer {
    pub fn new(
        storage: Arc<dyn FileStorageOps>,
        resolver: Arc<ReferenceResolver>,
        max_files: usize,
    ) -> Self {
        Self {
            storage,
            resolver,
            max_files,
        }
    }

    pub async fn analyze(&self, course_id: CourseId) -> UsageAnalysis {
        let (graph, notice) = self.resolver.content_graph_or_course_only(course_id).await;
        let enumerated = graph
            .enumerate_files(self.storage.as_ref(), self.max_files)
            .await;

        let mut by_extension: BTreeMap<String, ExtensionUsage> = BTreeMap::new();
        let mut by_area: BTreeMap<String, AreaUsage> = BTreeMap::new();
        let mut by_module: Vec<ModuleUsage> = graph
            .modules
            .iter()
            .map(|location| ModuleUsage {
                module_id: location.module.module_id,
                module_type: location.module.module_type.clone(),
                display_name: location.module.display_name.clone(),
                file_count: 0,
                total_size: 0,
            })
            .collect();

        for file in &enumerated.files {
            let extension = file
                .extension()
                .unwrap_or_else(|| NO_EXTENSION.to_string());
            let extension_usage = by_extension.entry(extension).or_default();
            extension_usage.count += 1;
            extension_usage.total_size += file.file_size;
            if extension_usage.mime_type.is_none() {
                extension_usage.mime_type = file.mime_type.clone();
            }

            let area_usage = by_area
                .entry(format!("{}/{}", file.component, file.file_area))
                .or_default();
            area_usage.count += 1;
            area_usage.total_size += file.file_size;

            if let Some(module_usage) = by_module
                .iter_mut()
                .find(|m| file.scope == Scope::Module(m.module_id))
            {
                module_usage.file_count += 1;
                module_usage.total_size += file.file_size;
            }
        }

        let mut largest_files = enumerated.files.clone();
        largest_files.sort_by(|a, b| b.file_size.cmp(&a.file_size).then(a.id.cmp(&b.id)));
        largest_files.truncate(LARGEST_FILES_LIMIT);

        let mut notices: Vec<ScanNotice> = notice.into_iter().collect();
        notices.extend(enumerated.notices);

        let total_size: FileSize = enumerated.files.iter().map(|f| f.file_size).sum();
        tracing::info!(
            course_id,
            files = enumerated.files.len(),
            total_size,
            "Usage analysis complete"
        );

        UsageAnalysis {
            course_id,
            total_files: enumerated.files.len(),
            total_size,
            by_extension,
            by_area,
            by_module,
            largest_files,
            truncated: enumerated.truncated,
            notices,
        }
    }

    pub async fn storage_stats(&self, course_id: CourseId) -> StorageStats {
        StorageStats::from(&self.analyze(course_id).await)
    }

    /// `None` when the file does not exist or does not belong to the course.
    pub async fn file_usage(
        &self,
        course_id: CourseId,
        file_id: FileId,
    ) -> Result<Option<FileUsage>, Error> {
        let Some(file) = self.storage.get_file(file_id).await? else {
            return Ok(None);
        };
        let graph = self.resolver.content_graph(course_id).await?;
        let module = match graph.locate(file.scope) {
            None => return Ok(None),
            Some(Location::Course) => None,
            Some(Location::Module(location)) => Some(location.module.clone()),
        };
        let is_referenced = self.resolver.is_referenced(&graph, &file).await?;
        Ok(Some(FileUsage {
            file_size_formatted: format_file_size(file.file_size),
            file,
            module,
            is_referenced,
        }))
    }
}
