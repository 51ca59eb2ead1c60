use core_types::{COURSE_COMPONENT, CourseId, ModuleId, ModuleInfo, Scope, StoredFile};

use crate::{
    course_catalog::{CatalogError, CourseCatalogOps},
    file_areas::FileAreaTable,
    file_storage::FileStorageOps,
    scan_notice::ScanNotice,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleLocation {
    pub module: ModuleInfo,
    pub file_areas: Vec<String>,
}

/// Where a scope sits in the course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location<'a> {
    Course,
    Module(&'a ModuleLocation),
}

/// Content bearing locations of one course, built once per request and shared by file
/// enumeration and reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseContentGraph {
    pub course_id: CourseId,
    pub modules: Vec<ModuleLocation>,
    pub course_scanned_areas: Vec<String>,
    pub course_referenced_areas: Vec<String>,
}

/// Files found by walking every scanned area of a course graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumeratedFiles {
    pub files: Vec<StoredFile>,
    pub truncated: bool,
    pub notices: Vec<ScanNotice>,
}

impl CourseContentGraph {
    pub async fn build(
        course_id: CourseId,
        catalog: &dyn CourseCatalogOps,
        area_table: &FileAreaTable,
    ) -> Result<Self, CatalogError> {
        let modules = catalog.course_modules(course_id).await?;
        Ok(Self::from_modules(course_id, modules, area_table))
    }

    pub fn from_modules(
        course_id: CourseId,
        modules: Vec<ModuleInfo>,
        area_table: &FileAreaTable,
    ) -> Self {
        let modules = modules
            .into_iter()
            .map(|module| ModuleLocation {
                file_areas: area_table.areas_for(&module.module_type).to_vec(),
                module,
            })
            .collect();
        Self {
            course_id,
            modules,
            course_scanned_areas: area_table.course_scanned_areas.clone(),
            course_referenced_areas: area_table.course_referenced_areas.clone(),
        }
    }

    pub fn module(&self, module_id: ModuleId) -> Option<&ModuleLocation> {
        self.modules.iter().find(|m| m.module.module_id == module_id)
    }

    /// `None` when the scope does not belong to this course.
    pub fn locate(&self, scope: Scope) -> Option<Location<'_>> {
        match scope {
            Scope::Course(course_id) if course_id == self.course_id => Some(Location::Course),
            Scope::Course(_) => None,
            Scope::Module(module_id) => self.module(module_id).map(Location::Module),
        }
    }

    /// Whether the file sits in an area this graph scans, under the owning component.
    pub fn is_scanned(&self, file: &StoredFile) -> bool {
        match self.locate(file.scope) {
            Some(Location::Course) => {
                file.component == COURSE_COMPONENT
                    && self.course_scanned_areas.contains(&file.file_area)
            }
            Some(Location::Module(location)) => {
                file.component == location.module.component()
                    && location.file_areas.contains(&file.file_area)
            }
            None => false,
        }
    }

    /// Lists the non directory files of every scanned area: course areas first, then each
    /// module's areas in catalog order. Failing areas are reported as notices and contribute
    /// no files.
    ///
    /// `limit` is checked between areas: each area is fetched whole, and once more than
    /// `limit` files were collected the result is cut to `limit` and the remaining areas are
    /// never fetched. A single oversized area is therefore still read in full. A zero limit
    /// never stops.
    pub async fn enumerate_files(
        &self,
        storage: &dyn FileStorageOps,
        limit: usize,
    ) -> EnumeratedFiles {
        let mut areas: Vec<(Scope, String, &str)> = self
            .course_scanned_areas
            .iter()
            .map(|area| {
                (
                    Scope::Course(self.course_id),
                    COURSE_COMPONENT.to_string(),
                    area.as_str(),
                )
            })
            .collect();
        for location in &self.modules {
            let component = location.module.component();
            for area in &location.file_areas {
                areas.push((location.module.scope(), component.clone(), area.as_str()));
            }
        }

        let mut result = EnumeratedFiles::default();
        for (scope, component, area) in areas {
            match storage.enumerate_files(scope, &component, area, None).await {
                Ok(files) => {
                    tracing::debug!(%scope, area, count = files.len(), "Enumerated file area");
                    result
                        .files
                        .extend(files.into_iter().filter(|f| !f.is_directory()));
                }
                Err(e) => {
                    tracing::warn!(%scope, area, error = %e, "Failed to enumerate file area");
                    result.notices.push(ScanNotice::AreaUnavailable {
                        scope,
                        file_area: area.to_string(),
                        message: e.to_string(),
                    });
                }
            }
            if limit > 0 && result.files.len() > limit {
                result.files.truncate(limit);
                result.truncated = true;
                result.notices.push(ScanNotice::Truncated { limit });
                tracing::warn!(
                    course_id = self.course_id,
                    limit,
                    "File enumeration truncated"
                );
                break;
            }
        }
        result
    }
}
