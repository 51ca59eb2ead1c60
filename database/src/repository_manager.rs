use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::repository::{
    audit_log_repository::AuditLogRepository, capability_repository::CapabilityRepository,
    course_repository::CourseRepository, module_record_repository::ModuleRecordRepository,
    setting_repository::SettingRepository, stored_file_repository::StoredFileRepository,
};

#[derive(Debug)]
pub struct RepositoryManager {
    stored_file_repository: StoredFileRepository,
    course_repository: CourseRepository,
    module_record_repository: ModuleRecordRepository,
    capability_repository: CapabilityRepository,
    audit_log_repository: AuditLogRepository,
    setting_repository: SettingRepository,
}

impl RepositoryManager {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self {
            stored_file_repository: StoredFileRepository::new(pool.clone()),
            course_repository: CourseRepository::new(pool.clone()),
            module_record_repository: ModuleRecordRepository::new(pool.clone()),
            capability_repository: CapabilityRepository::new(pool.clone()),
            audit_log_repository: AuditLogRepository::new(pool.clone()),
            setting_repository: SettingRepository::new(pool),
        }
    }

    pub fn get_stored_file_repository(&self) -> &StoredFileRepository {
        &self.stored_file_repository
    }

    pub fn get_course_repository(&self) -> &CourseRepository {
        &self.course_repository
    }

    pub fn get_module_record_repository(&self) -> &ModuleRecordRepository {
        &self.module_record_repository
    }

    pub fn get_capability_repository(&self) -> &CapabilityRepository {
        &self.capability_repository
    }

    pub fn get_audit_log_repository(&self) -> &AuditLogRepository {
        &self.audit_log_repository
    }

    pub fn get_settings_repository(&self) -> &SettingRepository {
        &self.setting_repository
    }
}
