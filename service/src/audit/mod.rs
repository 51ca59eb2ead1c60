pub mod db_audit_log;
pub mod mock_audit_log;

use async_trait::async_trait;
use core_types::events::AuditRecord;

/// Sink for the audit trail. Recording is fire-and-forget: implementations report their own
/// failures and never fail the caller.
#[async_trait]
pub trait AuditOps: Send + Sync {
    async fn record(&self, record: &AuditRecord);
}
