use presensi_application::{CapabilityOverview, OperationPermission};
use presensi_domain::CapabilitySet;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Approval authority of the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/capability-response.ts"
)]
pub struct CapabilityResponse {
    pub approval_level: u8,
    pub can_approve_org_wide: bool,
}

impl From<CapabilitySet> for CapabilityResponse {
    fn from(capability: CapabilitySet) -> Self {
        Self {
            approval_level: capability.approval_level().as_u8(),
            can_approve_org_wide: capability.can_approve_org_wide(),
        }
    }
}

/// Gate result for one operation and scope.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/operation-permission-response.ts"
)]
pub struct OperationPermissionResponse {
    pub operation: &'static str,
    pub scope: &'static str,
    pub permitted: bool,
}

impl From<OperationPermission> for OperationPermissionResponse {
    fn from(permission: OperationPermission) -> Self {
        Self {
            operation: permission.operation.as_str(),
            scope: permission.scope.as_str(),
            permitted: permission.permitted,
        }
    }
}

/// Capability plus every approval gate it opens.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/capability-overview-response.ts"
)]
pub struct CapabilityOverviewResponse {
    pub capability: CapabilityResponse,
    pub permissions: Vec<OperationPermissionResponse>,
}

impl From<CapabilityOverview> for CapabilityOverviewResponse {
    fn from(overview: CapabilityOverview) -> Self {
        Self {
            capability: CapabilityResponse::from(overview.capability),
            permissions: overview
                .permissions
                .into_iter()
                .map(OperationPermissionResponse::from)
                .collect(),
        }
    }
}

/// Incoming payload for an approval decision.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-approval-request.ts"
)]
pub struct SubmitApprovalRequest {
    pub decision: String,
    pub scope: String,
    pub note: Option<String>,
}
