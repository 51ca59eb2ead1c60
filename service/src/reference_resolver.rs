use std::collections::HashSet;
use std::sync::Arc;

use core_types::{COURSE_COMPONENT, CourseId, FileId, Scope, StoredFile};

use crate::{
    content_graph::{CourseContentGraph, Location},
    course_catalog::CourseCatalogOps,
    error::Error,
    file_areas::FileAreaTable,
    file_storage::FileStorageOps,
    reference_rules::{ReferenceRuleRegistry, RuleContext},
    scan_notice::ScanNotice,
};

/// Files provably referenced by course content, plus the areas whose references could not be
/// determined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    file_ids: HashSet<FileId>,
    unresolved: HashSet<(Scope, String)>,
}

impl ReferenceSet {
    pub fn insert(&mut self, file_id: FileId) {
        self.file_ids.insert(file_id);
    }

    pub fn extend(&mut self, file_ids: impl IntoIterator<Item = FileId>) {
        self.file_ids.extend(file_ids);
    }

    pub fn contains(&self, file_id: FileId) -> bool {
        self.file_ids.contains(&file_id)
    }

    pub fn mark_unresolved(&mut self, scope: Scope, file_area: &str) {
        self.unresolved.insert((scope, file_area.to_string()));
    }

    pub fn is_unresolved(&self, scope: Scope, file_area: &str) -> bool {
        self.unresolved.contains(&(scope, file_area.to_string()))
    }

    pub fn len(&self) -> usize {
        self.file_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_ids.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedReferences {
    pub references: ReferenceSet,
    pub notices: Vec<ScanNotice>,
}

impl ResolvedReferences {
    fn unresolved(&mut self, scope: Scope, file_area: &str, error: &Error) {
        tracing::warn!(%scope, file_area, error = %error, "Could not resolve file references");
        self.references.mark_unresolved(scope, file_area);
        self.notices.push(ScanNotice::ReferencesUnresolved {
            scope,
            file_area: file_area.to_string(),
            message: error.to_string(),
        });
    }
}

pub struct ReferenceResolver {
    storage: Arc<dyn FileStorageOps>,
    catalog: Arc<dyn CourseCatalogOps>,
    area_table: Arc<FileAreaTable>,
    rules: Arc<ReferenceRuleRegistry>,
}

impl ReferenceResolver {
    pub fn new(
        storage: Arc<dyn FileStorageOps>,
        catalog: Arc<dyn CourseCatalogOps>,
        area_table: Arc<FileAreaTable>,
        rules: Arc<ReferenceRuleRegistry>,
    ) -> Self {
        Self {
            storage,
            catalog,
            area_table,
            rules,
        }
    }

    pub async fn content_graph(&self, course_id: CourseId) -> Result<CourseContentGraph, Error> {
        Ok(CourseContentGraph::build(course_id, self.catalog.as_ref(), &self.area_table).await?)
    }

    pub fn area_table(&self) -> &FileAreaTable {
        &self.area_table
    }

    /// Graph of the course, or a graph of only the course level areas plus a notice when the
    /// course's modules cannot be listed.
    pub async fn content_graph_or_course_only(
        &self,
        course_id: CourseId,
    ) -> (CourseContentGraph, Option<ScanNotice>) {
        match self.content_graph(course_id).await {
            Ok(graph) => (graph, None),
            Err(e) => {
                tracing::warn!(course_id, error = %e, "Could not list course modules");
                (
                    CourseContentGraph::from_modules(course_id, vec![], &self.area_table),
                    Some(ScanNotice::ModuleListUnavailable {
                        course_id,
                        message: e.to_string(),
                    }),
                )
            }
        }
    }

    pub async fn resolve_used(&self, course_id: CourseId) -> ResolvedReferences {
        let (graph, notice) = self.content_graph_or_course_only(course_id).await;
        let mut resolved = self.resolve_in(&graph).await;
        if let Some(notice) = notice {
            resolved.notices.insert(0, notice);
        }
        resolved
    }

    pub async fn resolve_in(&self, graph: &CourseContentGraph) -> ResolvedReferences {
        let mut resolved = ResolvedReferences::default();
        let course_scope = Scope::Course(graph.course_id);

        for area in &graph.course_referenced_areas {
            match self
                .storage
                .enumerate_files(course_scope, COURSE_COMPONENT, area, None)
                .await
            {
                Ok(files) => resolved.references.extend(files.iter().map(|f| f.id)),
                Err(e) => resolved.unresolved(course_scope, area, &e.into()),
            }
        }

        let context = RuleContext {
            storage: self.storage.as_ref(),
            catalog: self.catalog.as_ref(),
        };
        for location in &graph.modules {
            let module = &location.module;
            let scope = module.scope();
            let component = module.component();

            for area in &location.file_areas {
                if self
                    .rules
                    .governing_rule(&module.module_type, area)
                    .is_some()
                {
                    continue;
                }
                match self
                    .storage
                    .enumerate_files(scope, &component, area, None)
                    .await
                {
                    Ok(files) => resolved.references.extend(files.iter().map(|f| f.id)),
                    Err(e) => resolved.unresolved(scope, area, &e.into()),
                }
            }

            if let Some(rule) = self.rules.rule_for(&module.module_type) {
                match rule.referenced_files(module, &context).await {
                    Ok(file_ids) => {
                        tracing::debug!(
                            module_id = module.module_id,
                            rule = rule.name(),
                            count = file_ids.len(),
                            "Resolved module references"
                        );
                        resolved.references.extend(file_ids);
                    }
                    Err(e) if rule.governed_areas().is_empty() => {
                        tracing::warn!(
                            module_id = module.module_id,
                            rule = rule.name(),
                            error = %e,
                            "Could not resolve additional module references"
                        );
                    }
                    Err(e) => {
                        for area in rule.governed_areas() {
                            resolved.unresolved(scope, area, &e);
                        }
                    }
                }
            }
        }

        resolved
    }

    /// Whether one file is referenced, decided the same way `resolve_in` decides it for the
    /// whole course. Files outside the graph are not referenced.
    pub async fn is_referenced(
        &self,
        graph: &CourseContentGraph,
        file: &StoredFile,
    ) -> Result<bool, Error> {
        match graph.locate(file.scope) {
            None => Ok(false),
            Some(Location::Course) => {
                if file.component != COURSE_COMPONENT
                    || !graph.course_referenced_areas.contains(&file.file_area)
                {
                    return Ok(false);
                }
                self.is_listed(file).await
            }
            Some(Location::Module(location)) => {
                let module = &location.module;
                if file.component != module.component() {
                    return Ok(false);
                }
                let context = RuleContext {
                    storage: self.storage.as_ref(),
                    catalog: self.catalog.as_ref(),
                };
                if let Some(rule) = self
                    .rules
                    .governing_rule(&module.module_type, &file.file_area)
                {
                    return rule.is_referenced(module, file, &context).await;
                }
                if location.file_areas.contains(&file.file_area) && self.is_listed(file).await? {
                    return Ok(true);
                }
                match self.rules.rule_for(&module.module_type) {
                    Some(rule) => rule.is_referenced(module, file, &context).await,
                    None => Ok(false),
                }
            }
        }
    }

    async fn is_listed(&self, file: &StoredFile) -> Result<bool, Error> {
        let files = self
            .storage
            .enumerate_files(file.scope, &file.component, &file.file_area, Some(file.item_id))
            .await?;
        Ok(files.iter().any(|f| f.id == file.id))
    }
}
