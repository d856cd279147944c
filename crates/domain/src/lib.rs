//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod capability;
mod context;
mod landing;
mod position;

pub use assignment::{AssignmentId, PositionAssignment, PositionAssignmentInput};
pub use capability::{
    ApprovalDecision, ApprovalOperation, ApprovalPolicy, ApprovalRequirement, ApprovalScope,
    CapabilitySet,
};
pub use context::{
    ActiveContextSelection, COMBINED_CONTEXT_NAME, Context, DefaultContextPolicy,
    active_assignments, current_context, primary_assignment_id, resolve_contexts,
    resolve_with_selected,
};
pub use landing::{LandingSurface, LegacyRoleLevels, resolve_landing_surface};
pub use position::{ApprovalLevel, Position, PositionId};
