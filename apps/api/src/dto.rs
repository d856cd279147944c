mod approvals;
mod auth;
mod common;
mod context;
mod positions;

#[cfg(test)]
mod tests;

pub use approvals::{
    CapabilityOverviewResponse, CapabilityResponse, OperationPermissionResponse,
    SubmitApprovalRequest,
};
pub use auth::{
    CreateSessionRequest, LandingResponse, MeResponse, SessionResponse, UserIdentityResponse,
};
pub use common::HealthResponse;
pub use context::{
    AvailableContextsResponse, ContextChangedEventResponse, ContextResponse,
    CurrentContextResponse, SwitchContextFailureResponse, SwitchContextRequest,
    SwitchContextResponse,
};
pub use positions::PositionAssignmentResponse;
