use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId, UserIdentity};
use presensi_domain::{
    ActiveContextSelection, ApprovalLevel, AssignmentId, Position, PositionAssignment,
    PositionAssignmentInput, PositionId,
};
use tokio::sync::Mutex;

use crate::{
    ActorSession, ApprovalForwardRequest, ApprovalGateway, ContextChangeNotifier, ContextChanged,
    ContextSelectionStore, ContextSessionId, PositionAssignmentRepository,
};

pub(crate) const EMPLOYEE: i64 = 77;

pub(crate) fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub(crate) fn assignment(
    id: i64,
    name: &str,
    level: u8,
    org_wide: bool,
    is_primary: bool,
) -> PositionAssignment {
    assignment_for(EMPLOYEE, id, name, level, org_wide, is_primary, true)
}

pub(crate) fn assignment_for(
    employee: i64,
    id: i64,
    name: &str,
    level: u8,
    org_wide: bool,
    is_primary: bool,
    is_active: bool,
) -> PositionAssignment {
    PositionAssignment::new(PositionAssignmentInput {
        id: Some(AssignmentId::new(id)),
        employee_id: EmployeeId::new(employee),
        position: Position::new(
            PositionId::new(id + 100),
            name,
            ApprovalLevel::new(level),
            org_wide,
        )
        .unwrap_or_else(|_| unreachable!()),
        is_primary,
        is_active,
        effective_from: days_from_today(-30),
        effective_until: None,
    })
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn actor_session(groups: &[&str]) -> ActorSession {
    actor_session_for(EMPLOYEE, groups)
}

pub(crate) fn actor_session_for(employee: i64, groups: &[&str]) -> ActorSession {
    ActorSession {
        session_id: ContextSessionId::new(),
        identity: UserIdentity::new(EmployeeId::new(employee), "sari", "Sari", None)
            .with_groups(groups.iter().map(|group| (*group).to_owned()).collect()),
        access_token: BackendAccessToken::new("token"),
    }
}

#[derive(Default)]
pub(crate) struct FakeAssignmentRepository {
    pub(crate) assignments: Mutex<HashMap<EmployeeId, Vec<PositionAssignment>>>,
    pub(crate) unavailable: Mutex<bool>,
    pub(crate) token_rejected: Mutex<bool>,
}

impl FakeAssignmentRepository {
    pub(crate) fn with(assignments: Vec<PositionAssignment>) -> Self {
        let mut map: HashMap<EmployeeId, Vec<PositionAssignment>> = HashMap::new();
        for assignment in assignments {
            map.entry(assignment.employee_id())
                .or_default()
                .push(assignment);
        }

        Self {
            assignments: Mutex::new(map),
            unavailable: Mutex::new(false),
            token_rejected: Mutex::new(false),
        }
    }

    pub(crate) async fn replace(&self, employee: i64, assignments: Vec<PositionAssignment>) {
        self.assignments
            .lock()
            .await
            .insert(EmployeeId::new(employee), assignments);
    }
}

#[async_trait]
impl PositionAssignmentRepository for FakeAssignmentRepository {
    async fn list_assignments_for_employee(
        &self,
        _access_token: &BackendAccessToken,
        employee_id: EmployeeId,
    ) -> AppResult<Vec<PositionAssignment>> {
        if *self.token_rejected.lock().await {
            return Err(AppError::Unauthorized("backend token revoked".to_owned()));
        }
        if *self.unavailable.lock().await {
            return Err(AppError::UpstreamUnavailable(
                "position assignment store is down".to_owned(),
            ));
        }

        Ok(self
            .assignments
            .lock()
            .await
            .get(&employee_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakeSelectionStore {
    pub(crate) selections: Mutex<HashMap<ContextSessionId, ActiveContextSelection>>,
}

#[async_trait]
impl ContextSelectionStore for FakeSelectionStore {
    async fn find_selection(
        &self,
        session_id: ContextSessionId,
    ) -> AppResult<Option<ActiveContextSelection>> {
        Ok(self.selections.lock().await.get(&session_id).cloned())
    }

    async fn initialize_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<ActiveContextSelection> {
        Ok(self
            .selections
            .lock()
            .await
            .entry(session_id)
            .or_insert(selection)
            .clone())
    }

    async fn save_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<()> {
        self.selections.lock().await.insert(session_id, selection);
        Ok(())
    }

    async fn delete_selection(&self, session_id: ContextSessionId) -> AppResult<()> {
        self.selections.lock().await.remove(&session_id);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) events: Mutex<Vec<ContextChanged>>,
}

#[async_trait]
impl ContextChangeNotifier for RecordingNotifier {
    async fn publish(&self, event: ContextChanged) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingApprovalGateway {
    pub(crate) requests: Mutex<Vec<ApprovalForwardRequest>>,
}

#[async_trait]
impl ApprovalGateway for RecordingApprovalGateway {
    async fn forward_decision(
        &self,
        _access_token: &BackendAccessToken,
        request: ApprovalForwardRequest,
    ) -> AppResult<()> {
        self.requests.lock().await.push(request);
        Ok(())
    }
}
