pub mod audit_log_repository;
pub mod capability_repository;
pub mod course_repository;
pub mod module_record_repository;
pub mod setting_repository;
pub mod stored_file_repository;
