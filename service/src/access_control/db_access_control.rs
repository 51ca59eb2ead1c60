use std::sync::Arc;

use async_trait::async_trait;
use core_types::{Capability, CourseId, UserId};
use database::repository_manager::RepositoryManager;

use crate::access_control::AccessControlOps;

#[derive(Debug)]
pub struct DbAccessControl {
    repository_manager: Arc<RepositoryManager>,
}

impl DbAccessControl {
    pub fn new(repository_manager: Arc<RepositoryManager>) -> Self {
        Self { repository_manager }
    }
}

#[async_trait]
impl AccessControlOps for DbAccessControl {
    async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> bool {
        match self
            .repository_manager
            .get_capability_repository()
            .has_capability(user_id, capability, course_id)
            .await
        {
            Ok(granted) => granted,
            Err(e) => {
                tracing::error!(
                    user_id,
                    course_id,
                    capability = %capability,
                    error = %e,
                    "Capability lookup failed, denying access"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use database::setup_test_db;

    use super::*;

    #[async_std::test]
    async fn test_capability_grants_are_per_course() {
        let pool = Arc::new(setup_test_db().await);
        let repository_manager = Arc::new(RepositoryManager::new(pool));
        let access = DbAccessControl::new(repository_manager.clone());

        repository_manager
            .get_capability_repository()
            .grant(5, Capability::Delete, 1)
            .await
            .unwrap();

        assert!(access.has_capability(5, Capability::Delete, 1).await);
        assert!(!access.has_capability(5, Capability::Delete, 2).await);
        assert!(!access.has_capability(5, Capability::View, 1).await);
        assert!(!access.has_capability(6, Capability::Delete, 1).await);
    }
}
