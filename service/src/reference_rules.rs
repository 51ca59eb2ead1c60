use std::collections::HashMap;

use async_trait::async_trait;
use core_types::{FileId, ModuleInfo, StoredFile};

use crate::{
    course_catalog::{CourseCatalogOps, ModuleRecord},
    error::Error,
    file_storage::FileStorageOps,
};

/// Collaborators a rule may consult.
pub struct RuleContext<'a> {
    pub storage: &'a dyn FileStorageOps,
    pub catalog: &'a dyn CourseCatalogOps,
}

/// Finds files of a module that are referenced through the module's records.
///
/// Areas a rule governs are not referenced wholesale; only the files the rule vouches for are.
/// A rule governing no areas only adds references on top of the wholesale area lookups.
#[async_trait]
pub trait ReferenceRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn governed_areas(&self) -> &'static [&'static str];

    fn governs(&self, file_area: &str) -> bool {
        self.governed_areas().contains(&file_area)
    }

    async fn referenced_files(
        &self,
        module: &ModuleInfo,
        context: &RuleContext<'_>,
    ) -> Result<Vec<FileId>, Error>;

    /// Same decision as `referenced_files`, for one file of the module.
    async fn is_referenced(
        &self,
        module: &ModuleInfo,
        file: &StoredFile,
        context: &RuleContext<'_>,
    ) -> Result<bool, Error>;
}

fn unexpected_record(module: &ModuleInfo, record: &ModuleRecord) -> Error {
    Error::StorageLookupFailure(format!(
        "Unexpected {:?} record for {} module {}",
        record, module.module_type, module.module_id
    ))
}

pub const RESOURCE_CONTENT_AREA: &str = "content";

/// A resource always references its designated main file. The rest of the `content` area
/// stays referenced wholesale, since the main file may embed its siblings.
pub struct ResourceMainFileRule;

impl ResourceMainFileRule {
    async fn main_file(
        &self,
        module: &ModuleInfo,
        context: &RuleContext<'_>,
    ) -> Result<Option<String>, Error> {
        match context
            .catalog
            .module_record(&module.module_type, module.instance_id)
            .await?
        {
            ModuleRecord::Resource { main_file } => Ok(main_file),
            ModuleRecord::Missing => Ok(None),
            record => Err(unexpected_record(module, &record)),
        }
    }
}

/// `designator` is either a bare file name or a full path such as `/docs/index.html`.
fn is_designated(file: &StoredFile, designator: &str) -> bool {
    if file.is_directory() {
        return false;
    }
    if designator.contains('/') {
        let full_path = format!("{}{}", file.file_path, file.file_name);
        full_path == designator || full_path == format!("/{}", designator)
    } else {
        file.file_name == designator
    }
}

#[async_trait]
impl ReferenceRule for ResourceMainFileRule {
    fn name(&self) -> &'static str {
        "resource_main_file"
    }

    fn governed_areas(&self) -> &'static [&'static str] {
        &[]
    }

    async fn referenced_files(
        &self,
        module: &ModuleInfo,
        context: &RuleContext<'_>,
    ) -> Result<Vec<FileId>, Error> {
        let Some(designator) = self.main_file(module, context).await? else {
            return Ok(vec![]);
        };
        let files = context
            .storage
            .enumerate_files(
                module.scope(),
                &module.component(),
                RESOURCE_CONTENT_AREA,
                None,
            )
            .await?;
        Ok(files
            .iter()
            .filter(|file| is_designated(file, &designator))
            .map(|file| file.id)
            .collect())
    }

    async fn is_referenced(
        &self,
        module: &ModuleInfo,
        file: &StoredFile,
        context: &RuleContext<'_>,
    ) -> Result<bool, Error> {
        if file.file_area != RESOURCE_CONTENT_AREA || file.component != module.component() {
            return Ok(false);
        }
        Ok(self
            .main_file(module, context)
            .await?
            .is_some_and(|designator| is_designated(file, &designator)))
    }
}

/// Files keyed by the id of a sub-record (book chapter, forum post, glossary entry) are
/// referenced while that sub-record exists.
pub struct ItemRecordRule {
    name: &'static str,
    areas: &'static [&'static str],
    item_ids: fn(&ModuleRecord) -> Option<&[i64]>,
}

impl ItemRecordRule {
    pub fn book_chapters() -> Self {
        Self {
            name: "book_chapters",
            areas: &["chapter"],
            item_ids: |record| match record {
                ModuleRecord::Book { chapter_ids } => Some(chapter_ids.as_slice()),
                _ => None,
            },
        }
    }

    pub fn forum_posts() -> Self {
        Self {
            name: "forum_posts",
            areas: &["post", "attachment"],
            item_ids: |record| match record {
                ModuleRecord::Forum { post_ids } => Some(post_ids.as_slice()),
                _ => None,
            },
        }
    }

    pub fn glossary_entries() -> Self {
        Self {
            name: "glossary_entries",
            areas: &["entry", "attachment"],
            item_ids: |record| match record {
                ModuleRecord::Glossary { entry_ids } => Some(entry_ids.as_slice()),
                _ => None,
            },
        }
    }

    async fn existing_items(
        &self,
        module: &ModuleInfo,
        context: &RuleContext<'_>,
    ) -> Result<Vec<i64>, Error> {
        let record = context
            .catalog
            .module_record(&module.module_type, module.instance_id)
            .await?;
        if record == ModuleRecord::Missing {
            return Ok(vec![]);
        }
        (self.item_ids)(&record)
            .map(<[i64]>::to_vec)
            .ok_or_else(|| unexpected_record(module, &record))
    }
}

#[async_trait]
impl ReferenceRule for ItemRecordRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn governed_areas(&self) -> &'static [&'static str] {
        self.areas
    }

    async fn referenced_files(
        &self,
        module: &ModuleInfo,
        context: &RuleContext<'_>,
    ) -> Result<Vec<FileId>, Error> {
        let item_ids = self.existing_items(module, context).await?;
        let component = module.component();
        let mut referenced = vec![];
        for area in self.areas {
            for item_id in &item_ids {
                let files = context
                    .storage
                    .enumerate_files(module.scope(), &component, area, Some(*item_id))
                    .await?;
                referenced.extend(files.iter().filter(|f| !f.is_directory()).map(|f| f.id));
            }
        }
        Ok(referenced)
    }

    async fn is_referenced(
        &self,
        module: &ModuleInfo,
        file: &StoredFile,
        context: &RuleContext<'_>,
    ) -> Result<bool, Error> {
        if file.is_directory()
            || !self.governs(&file.file_area)
            || file.component != module.component()
        {
            return Ok(false);
        }
        Ok(self
            .existing_items(module, context)
            .await?
            .contains(&file.item_id))
    }
}

/// Reference rules keyed by module type.
pub struct ReferenceRuleRegistry {
    rules: HashMap<String, Box<dyn ReferenceRule>>,
}

impl ReferenceRuleRegistry {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Replaces any rule already registered for the module type.
    pub fn register(&mut self, module_type: impl Into<String>, rule: Box<dyn ReferenceRule>) {
        self.rules.insert(module_type.into(), rule);
    }

    pub fn rule_for(&self, module_type: &str) -> Option<&dyn ReferenceRule> {
        self.rules.get(module_type).map(|rule| rule.as_ref())
    }

    /// Rule deciding references in the given area of the module type, if any.
    pub fn governing_rule(&self, module_type: &str, file_area: &str) -> Option<&dyn ReferenceRule> {
        self.rule_for(module_type)
            .filter(|rule| rule.governs(file_area))
    }
}

impl Default for ReferenceRuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("resource", Box::new(ResourceMainFileRule));
        registry.register("book", Box::new(ItemRecordRule::book_chapters()));
        registry.register("forum", Box::new(ItemRecordRule::forum_posts()));
        registry.register("glossary", Box::new(ItemRecordRule::glossary_entries()));
        registry
    }
}

#[cfg(test)]
mod tests {
    use core_types::{Scope, module_component};

    use super::*;
    use crate::{
        course_catalog::mock_course_catalog::MockCourseCatalog,
        file_storage::mock_file_storage::{MockFileStorage, stored_file},
    };

    #[async_std::test]
    async fn test_resource_rule_vouches_for_main_file() {
        let catalog = MockCourseCatalog::new();
        let module = catalog.add_module(1, 10, "resource", 100, "Notes");
        catalog.set_record(
            "resource",
            100,
            ModuleRecord::Resource {
                main_file: Some("notes.pdf".to_string()),
            },
        );
        let storage = MockFileStorage::new();
        let component = module_component("resource");
        let main = storage.add_file(Scope::Module(10), &component, "content", 0, "notes.pdf", 10);
        let stale = storage.add_file(Scope::Module(10), &component, "content", 0, "old.pdf", 10);
        let context = RuleContext {
            storage: &storage,
            catalog: &catalog,
        };

        let rule = ResourceMainFileRule;
        assert_eq!(
            rule.referenced_files(&module, &context).await.unwrap(),
            vec![main]
        );
        let stale_file = storage.get_file(stale).await.unwrap().unwrap();
        assert!(!rule.is_referenced(&module, &stale_file, &context).await.unwrap());

        let intro = storage.add_file(Scope::Module(10), &component, "intro", 0, "notes.pdf", 10);
        let intro_file = storage.get_file(intro).await.unwrap().unwrap();
        assert!(!rule.is_referenced(&module, &intro_file, &context).await.unwrap());

        let foreign = storage.add_file(Scope::Module(10), "mod_other", "content", 0, "notes.pdf", 10);
        let foreign_file = storage.get_file(foreign).await.unwrap().unwrap();
        assert!(!rule.is_referenced(&module, &foreign_file, &context).await.unwrap());
        let main_file = storage.get_file(main).await.unwrap().unwrap();
        assert!(rule.is_referenced(&module, &main_file, &context).await.unwrap());
    }

    #[test]
    fn test_resource_main_file_by_path() {
        let mut file = stored_file(1, Scope::Module(1), "mod_resource", "content", 0, "index.html", 1);
        file.file_path = "/site/".to_string();
        assert!(is_designated(&file, "/site/index.html"));
        assert!(is_designated(&file, "site/index.html"));
        assert!(!is_designated(&file, "/index.html"));
        assert!(is_designated(&file, "index.html"));
    }

    #[async_std::test]
    async fn test_item_rule_references_existing_items() {
        let catalog = MockCourseCatalog::new();
        let module = catalog.add_module(1, 20, "forum", 200, "Questions");
        catalog.set_record("forum", 200, ModuleRecord::Forum { post_ids: vec![5] });
        let storage = MockFileStorage::new();
        let component = module_component("forum");
        let post_image = storage.add_file(Scope::Module(20), &component, "post", 5, "a.png", 1);
        let attachment = storage.add_file(Scope::Module(20), &component, "attachment", 5, "b.pdf", 1);
        let orphan = storage.add_file(Scope::Module(20), &component, "attachment", 6, "c.pdf", 1);
        let context = RuleContext {
            storage: &storage,
            catalog: &catalog,
        };

        let rule = ItemRecordRule::forum_posts();
        assert_eq!(
            rule.referenced_files(&module, &context).await.unwrap(),
            vec![post_image, attachment]
        );
        let orphan_file = storage.get_file(orphan).await.unwrap().unwrap();
        assert!(!rule.is_referenced(&module, &orphan_file, &context).await.unwrap());
    }

    #[async_std::test]
    async fn test_missing_record_references_nothing_and_mismatch_fails() {
        let catalog = MockCourseCatalog::new();
        let module = catalog.add_module(1, 30, "book", 300, "Handbook");
        let storage = MockFileStorage::new();
        let context = RuleContext {
            storage: &storage,
            catalog: &catalog,
        };
        let rule = ItemRecordRule::book_chapters();
        assert!(rule.referenced_files(&module, &context).await.unwrap().is_empty());

        catalog.set_record("book", 300, ModuleRecord::Unsupported);
        assert!(rule.referenced_files(&module, &context).await.is_err());
    }

    #[test]
    fn test_registry_governing_rule() {
        let registry = ReferenceRuleRegistry::default();
        assert_eq!(
            registry.governing_rule("forum", "attachment").map(|r| r.name()),
            Some("forum_posts")
        );
        assert!(registry.governing_rule("forum", "intro").is_none());
        assert!(registry.governing_rule("page", "content").is_none());
        assert!(registry.governing_rule("resource", "content").is_none());
    }
}
