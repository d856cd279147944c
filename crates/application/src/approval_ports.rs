use async_trait::async_trait;
use presensi_core::{AppResult, BackendAccessToken, EmployeeId};
use presensi_domain::{ApprovalDecision, ApprovalOperation, ApprovalScope, AssignmentId};

/// Decision forwarded to the backend after the capability gate passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalForwardRequest {
    /// Workflow the record belongs to.
    pub operation: ApprovalOperation,
    /// Backend record identifier.
    pub record_id: i64,
    /// Approve or reject.
    pub decision: ApprovalDecision,
    /// Scope the approver claimed.
    pub scope: ApprovalScope,
    /// Approver employee.
    pub approver_id: EmployeeId,
    /// Assignment the approver acted under, `None` for combined.
    pub acting_assignment_id: Option<AssignmentId>,
    /// Optional reviewer note.
    pub note: Option<String>,
}

/// Port to the backend endpoints that record approval decisions.
#[async_trait]
pub trait ApprovalGateway: Send + Sync {
    /// Records the decision in the backend.
    async fn forward_decision(
        &self,
        access_token: &BackendAccessToken,
        request: ApprovalForwardRequest,
    ) -> AppResult<()>;
}
