use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_types::{Capability, CourseId, UserId};

use crate::access_control::AccessControlOps;

#[derive(Default)]
struct MockState {
    grants: HashSet<(UserId, Capability, CourseId)>,
    checks: usize,
}

/// Mock implementation of AccessControlOps for testing
#[derive(Clone, Default)]
pub struct MockAccessControl {
    state: Arc<Mutex<MockState>>,
}

impl MockAccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: UserId, capability: Capability, course_id: CourseId) {
        self.state
            .lock()
            .unwrap()
            .grants
            .insert((user_id, capability, course_id));
    }

    pub fn revoke(&self, user_id: UserId, capability: Capability, course_id: CourseId) {
        self.state
            .lock()
            .unwrap()
            .grants
            .remove(&(user_id, capability, course_id));
    }

    pub fn check_count(&self) -> usize {
        self.state.lock().unwrap().checks
    }
}

#[async_trait]
impl AccessControlOps for MockAccessControl {
    async fn has_capability(
        &self,
        user_id: UserId,
        capability: Capability,
        course_id: CourseId,
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        state.checks += 1;
        state.grants.contains(&(user_id, capability, course_id))
    }
}
