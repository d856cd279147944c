use std::collections::HashMap;

use async_trait::async_trait;
use presensi_application::PositionAssignmentRepository;
use presensi_core::{AppResult, BackendAccessToken, EmployeeId};
use presensi_domain::PositionAssignment;
use tokio::sync::RwLock;

/// In-memory assignment source seeded directly by the caller.
#[derive(Debug, Default)]
pub struct InMemoryPositionAssignmentRepository {
    assignments: RwLock<HashMap<EmployeeId, Vec<PositionAssignment>>>,
}

impl InMemoryPositionAssignmentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every assignment held for the employees present in `assignments`.
    pub async fn replace_assignments(&self, assignments: Vec<PositionAssignment>) {
        let mut grouped: HashMap<EmployeeId, Vec<PositionAssignment>> = HashMap::new();
        for assignment in assignments {
            grouped
                .entry(assignment.employee_id())
                .or_default()
                .push(assignment);
        }

        self.assignments.write().await.extend(grouped);
    }
}

#[async_trait]
impl PositionAssignmentRepository for InMemoryPositionAssignmentRepository {
    async fn list_assignments_for_employee(
        &self,
        _access_token: &BackendAccessToken,
        employee_id: EmployeeId,
    ) -> AppResult<Vec<PositionAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(&employee_id)
            .cloned()
            .unwrap_or_default())
    }
}
