use std::sync::Arc;

use async_trait::async_trait;
use core_types::events::AuditRecord;
use database::repository_manager::RepositoryManager;

use crate::audit::AuditOps;

#[derive(Debug)]
pub struct DbAuditLog {
    repository_manager: Arc<RepositoryManager>,
}

impl DbAuditLog {
    pub fn new(repository_manager: Arc<RepositoryManager>) -> Self {
        Self { repository_manager }
    }
}

#[async_trait]
impl AuditOps for DbAuditLog {
    async fn record(&self, record: &AuditRecord) {
        if let Err(e) = self
            .repository_manager
            .get_audit_log_repository()
            .add_log_entry(record)
            .await
        {
            tracing::error!(
                event_id = %record.event_id,
                file_id = record.file_id,
                error = %e,
                "Failed to write audit record"
            );
        }
    }
}
