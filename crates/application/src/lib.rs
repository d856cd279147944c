//! Application services and ports for position contexts and approval capability.

#![forbid(unsafe_code)]

mod approval_ports;
mod capability_service;
mod context_ports;
mod context_service;
mod identity_ports;
mod identity_service;

#[cfg(test)]
mod test_support;

pub use approval_ports::{ApprovalForwardRequest, ApprovalGateway};
pub use capability_service::{
    CapabilityOverview, CapabilityService, LandingResolution, OperationPermission,
    SubmitApprovalInput,
};
pub use context_ports::{
    ActorSession, ContextChangeNotifier, ContextChanged, ContextSelectionStore, ContextSessionId,
    PositionAssignmentRepository,
};
pub use context_service::{ContextAvailability, ContextService};
pub use identity_ports::IdentityProvider;
pub use identity_service::IdentityService;
