pub mod db_course_catalog;
pub mod mock_course_catalog;

use async_trait::async_trait;
use core_types::{CourseId, ModuleInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    LookupFailed(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::LookupFailed(msg) => write!(f, "Catalog lookup failed: {}", msg),
        }
    }
}

/// Type specific record of a module instance, holding the fields that point at files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRecord {
    /// `main_file` is a file name, or a path such as `/docs/index.html`.
    Resource { main_file: Option<String> },
    Book { chapter_ids: Vec<i64> },
    Forum { post_ids: Vec<i64> },
    Glossary { entry_ids: Vec<i64> },
    /// The instance record no longer exists.
    Missing,
    /// The catalog has no structured record for this module type.
    Unsupported,
}

#[async_trait]
pub trait CourseCatalogOps: Send + Sync {
    /// Modules of the course in catalog order.
    async fn course_modules(&self, course_id: CourseId) -> Result<Vec<ModuleInfo>, CatalogError>;

    async fn module_record(
        &self,
        module_type: &str,
        instance_id: i64,
    ) -> Result<ModuleRecord, CatalogError>;
}
