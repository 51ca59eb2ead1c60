use std::sync::Arc;

use async_trait::async_trait;
use core_types::{CourseId, ModuleInfo};
use database::{database_error::DatabaseError, repository_manager::RepositoryManager};

use crate::course_catalog::{CatalogError, CourseCatalogOps, ModuleRecord};

#[derive(Debug)]
pub struct DbCourseCatalog {
    repository_manager: Arc<RepositoryManager>,
}

impl DbCourseCatalog {
    pub fn new(repository_manager: Arc<RepositoryManager>) -> Self {
        Self { repository_manager }
    }
}

fn lookup_error(what: &str, err: DatabaseError) -> CatalogError {
    CatalogError::LookupFailed(format!("{}: {}", what, err))
}

#[async_trait]
impl CourseCatalogOps for DbCourseCatalog {
    async fn course_modules(&self, course_id: CourseId) -> Result<Vec<ModuleInfo>, CatalogError> {
        let modules = self
            .repository_manager
            .get_course_repository()
            .get_course_modules(course_id)
            .await
            .map_err(|e| lookup_error(&format!("modules of course {}", course_id), e))?;

        Ok(modules
            .into_iter()
            .map(|module| ModuleInfo {
                module_id: module.id,
                module_type: module.module_type,
                instance_id: module.instance_id,
                display_name: module.name,
            })
            .collect())
    }

    async fn module_record(
        &self,
        module_type: &str,
        instance_id: i64,
    ) -> Result<ModuleRecord, CatalogError> {
        let repository = self.repository_manager.get_module_record_repository();
        let what = format!("{} record {}", module_type, instance_id);
        let record = match module_type {
            "resource" => match repository
                .get_resource_main_file(instance_id)
                .await
                .map_err(|e| lookup_error(&what, e))?
            {
                Some(main_file) => ModuleRecord::Resource { main_file },
                None => ModuleRecord::Missing,
            },
            "book" => ModuleRecord::Book {
                chapter_ids: repository
                    .get_book_chapter_ids(instance_id)
                    .await
                    .map_err(|e| lookup_error(&what, e))?,
            },
            "forum" => ModuleRecord::Forum {
                post_ids: repository
                    .get_forum_post_ids(instance_id)
                    .await
                    .map_err(|e| lookup_error(&what, e))?,
            },
            "glossary" => ModuleRecord::Glossary {
                entry_ids: repository
                    .get_glossary_entry_ids(instance_id)
                    .await
                    .map_err(|e| lookup_error(&what, e))?,
            },
            _ => ModuleRecord::Unsupported,
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use database::setup_test_db;

    use super::*;

    #[async_std::test]
    async fn test_modules_and_records() {
        let pool = Arc::new(setup_test_db().await);
        let repository_manager = Arc::new(RepositoryManager::new(pool));
        let catalog = DbCourseCatalog::new(repository_manager.clone());

        let course_id = repository_manager
            .get_course_repository()
            .add_course("Biology 101", "BIO101")
            .await
            .unwrap();
        let resource_id = repository_manager
            .get_module_record_repository()
            .add_resource("Lecture notes", Some("notes.pdf"))
            .await
            .unwrap();
        let module_id = repository_manager
            .get_course_repository()
            .add_course_module(course_id, "resource", resource_id, "Lecture notes")
            .await
            .unwrap();

        let modules = catalog.course_modules(course_id).await.unwrap();
        assert_eq!(
            modules,
            vec![ModuleInfo {
                module_id,
                module_type: "resource".to_string(),
                instance_id: resource_id,
                display_name: "Lecture notes".to_string(),
            }]
        );

        assert_eq!(
            catalog.module_record("resource", resource_id).await.unwrap(),
            ModuleRecord::Resource {
                main_file: Some("notes.pdf".to_string())
            }
        );
        assert_eq!(
            catalog.module_record("resource", 999).await.unwrap(),
            ModuleRecord::Missing
        );
        assert_eq!(
            catalog.module_record("book", 5).await.unwrap(),
            ModuleRecord::Book {
                chapter_ids: vec![]
            }
        );
        assert_eq!(
            catalog.module_record("page", 1).await.unwrap(),
            ModuleRecord::Unsupported
        );
    }
}
