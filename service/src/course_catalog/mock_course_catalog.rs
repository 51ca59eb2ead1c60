use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_types::{CourseId, ModuleInfo};

use crate::course_catalog::{CatalogError, CourseCatalogOps, ModuleRecord};

/// Internal state for MockCourseCatalog
#[derive(Default)]
struct MockState {
    modules: HashMap<CourseId, Vec<ModuleInfo>>,
    records: HashMap<(String, i64), ModuleRecord>,
    fail_modules_for: HashSet<CourseId>,
    fail_record_for: HashSet<(String, i64)>,
    module_list_calls: usize,
    record_calls: usize,
}

/// Mock implementation of CourseCatalogOps for testing
///
/// Modules are returned in the order they were added. Record lookups for instances that
/// were never configured return `ModuleRecord::Missing`.
#[derive(Clone, Default)]
pub struct MockCourseCatalog {
    state: Arc<Mutex<MockState>>,
}

impl MockCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(
        &self,
        course_id: CourseId,
        module_id: i64,
        module_type: &str,
        instance_id: i64,
        display_name: &str,
    ) -> ModuleInfo {
        let module = ModuleInfo {
            module_id,
            module_type: module_type.to_string(),
            instance_id,
            display_name: display_name.to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .modules
            .entry(course_id)
            .or_default()
            .push(module.clone());
        module
    }

    pub fn remove_module(&self, course_id: CourseId, module_id: i64) {
        if let Some(modules) = self.state.lock().unwrap().modules.get_mut(&course_id) {
            modules.retain(|m| m.module_id != module_id);
        }
    }

    pub fn set_record(&self, module_type: &str, instance_id: i64, record: ModuleRecord) {
        self.state
            .lock()
            .unwrap()
            .records
            .insert((module_type.to_string(), instance_id), record);
    }

    /// Make course_modules fail for a course
    pub fn fail_modules_for(&self, course_id: CourseId) {
        self.state.lock().unwrap().fail_modules_for.insert(course_id);
    }

    /// Make module_record fail for one instance
    pub fn fail_record_for(&self, module_type: &str, instance_id: i64) {
        self.state
            .lock()
            .unwrap()
            .fail_record_for
            .insert((module_type.to_string(), instance_id));
    }

    pub fn call_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.module_list_calls + state.record_calls
    }
}

#[async_trait]
impl CourseCatalogOps for MockCourseCatalog {
    async fn course_modules(&self, course_id: CourseId) -> Result<Vec<ModuleInfo>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.module_list_calls += 1;
        if state.fail_modules_for.contains(&course_id) {
            return Err(CatalogError::LookupFailed(format!(
                "Mock module list failure for course {}",
                course_id
            )));
        }
        Ok(state.modules.get(&course_id).cloned().unwrap_or_default())
    }

    async fn module_record(
        &self,
        module_type: &str,
        instance_id: i64,
    ) -> Result<ModuleRecord, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.record_calls += 1;
        let key = (module_type.to_string(), instance_id);
        if state.fail_record_for.contains(&key) {
            return Err(CatalogError::LookupFailed(format!(
                "Mock record failure for {} {}",
                module_type, instance_id
            )));
        }
        Ok(state
            .records
            .get(&key)
            .cloned()
            .unwrap_or(ModuleRecord::Missing))
    }
}
