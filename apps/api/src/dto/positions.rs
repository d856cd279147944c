use presensi_domain::PositionAssignment;
use serde::Serialize;
use ts_rs::TS;

/// API representation of an active position assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/position-assignment-response.ts"
)]
pub struct PositionAssignmentResponse {
    pub id: Option<i64>,
    pub employee_id: i64,
    pub position_id: i64,
    pub position_name: String,
    pub approval_level: u8,
    pub can_approve_org_wide: bool,
    pub is_primary: bool,
    pub effective_from: String,
    pub effective_until: Option<String>,
}

impl From<PositionAssignment> for PositionAssignmentResponse {
    fn from(assignment: PositionAssignment) -> Self {
        let position = assignment.position();

        Self {
            id: assignment.id().map(|id| id.as_i64()),
            employee_id: assignment.employee_id().as_i64(),
            position_id: position.id().as_i64(),
            position_name: position.display_name().as_str().to_owned(),
            approval_level: position.approval_level().as_u8(),
            can_approve_org_wide: position.can_approve_org_wide(),
            is_primary: assignment.is_primary(),
            effective_from: assignment.effective_from().to_string(),
            effective_until: assignment.effective_until().map(|date| date.to_string()),
        }
    }
}
