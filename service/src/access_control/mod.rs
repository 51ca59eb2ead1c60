pub mod db_access_control;
pub mod mock_access_control;

use async_trait::async_trait;
use core_types::{Capability, CourseId, UserId};

#[async_trait]
pub trait AccessControlOps: Send + Sync {
    /// Lookup failures deny.
    async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> bool;
}
