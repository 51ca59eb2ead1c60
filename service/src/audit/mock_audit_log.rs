use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_types::events::AuditRecord;

use crate::audit::AuditOps;

/// Mock implementation of AuditOps collecting every record in memory
#[derive(Clone, Default)]
pub struct MockAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MockAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditOps for MockAuditLog {
    async fn record(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}
