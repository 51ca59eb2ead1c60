use std::sync::{Arc, OnceLock};

use database::{get_db_pool, repository_manager::RepositoryManager};

use crate::{
    access_control::db_access_control::DbAccessControl,
    audit::db_audit_log::DbAuditLog,
    clock::SystemClock,
    course_catalog::db_course_catalog::DbCourseCatalog,
    error::Error,
    file_storage::db_file_storage::DbFileStorage,
    report_service::{ReportCollaborators, ReportService},
    settings_service::SettingsService,
    view_models::Settings,
};

pub async fn create_app_services() -> Result<Arc<AppServices>, Error> {
    let pool = get_db_pool()
        .await
        .map_err(|e| Error::DbError(format!("DB pool initialization failed: {}", e)))?;
    let repository_manager = Arc::new(RepositoryManager::new(pool));

    let settings = SettingsService::new(Arc::clone(&repository_manager))
        .load_settings()
        .await?;

    Ok(Arc::new(AppServices::new(
        repository_manager,
        Arc::new(settings),
    )))
}

/// Lazily constructed services sharing one repository manager and one settings snapshot.
pub struct AppServices {
    report: OnceLock<Arc<ReportService>>,
    settings: OnceLock<Arc<SettingsService>>,
    repository_manager: Arc<RepositoryManager>,
    app_settings: Arc<Settings>,
}

impl AppServices {
    pub fn new(repository_manager: Arc<RepositoryManager>, settings: Arc<Settings>) -> Self {
        Self {
            report: OnceLock::new(),
            settings: OnceLock::new(),
            repository_manager,
            app_settings: settings,
        }
    }

    pub fn report(&self) -> Arc<ReportService> {
        self.report
            .get_or_init(|| {
                let collaborators = ReportCollaborators {
                    storage: Arc::new(DbFileStorage::new(Arc::clone(&self.repository_manager))),
                    catalog: Arc::new(DbCourseCatalog::new(Arc::clone(&self.repository_manager))),
                    access: Arc::new(DbAccessControl::new(Arc::clone(&self.repository_manager))),
                    audit: Arc::new(DbAuditLog::new(Arc::clone(&self.repository_manager))),
                };
                Arc::new(ReportService::new(
                    collaborators,
                    Arc::clone(&self.app_settings),
                    Arc::new(SystemClock),
                ))
            })
            .clone()
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        self.settings
            .get_or_init(|| Arc::new(SettingsService::new(Arc::clone(&self.repository_manager))))
            .clone()
    }

    pub fn repository_manager(&self) -> Arc<RepositoryManager> {
        Arc::clone(&self.repository_manager)
    }

    pub fn app_settings(&self) -> Arc<Settings> {
        Arc::clone(&self.app_settings)
    }
}
