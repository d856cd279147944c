use presensi_application::{ContextAvailability, ContextChanged};
use presensi_domain::{CapabilitySet, Context};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::CapabilityResponse;

/// API representation of one selectable context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/context-response.ts"
)]
pub struct ContextResponse {
    /// `null` for the combined context.
    pub assignment_id: Option<i64>,
    pub position_id: Option<i64>,
    pub display_name: String,
    pub approval_level: u8,
    pub can_approve_org_wide: bool,
    pub is_primary: bool,
    pub is_current: bool,
    pub is_combined: bool,
}

impl From<&Context> for ContextResponse {
    fn from(context: &Context) -> Self {
        Self {
            assignment_id: context.assignment_id().map(|id| id.as_i64()),
            position_id: context.position_id().map(|id| id.as_i64()),
            display_name: context.display_name().to_owned(),
            approval_level: context.approval_level().as_u8(),
            can_approve_org_wide: context.can_approve_org_wide(),
            is_primary: context.is_primary(),
            is_current: context.is_current(),
            is_combined: context.is_combined(),
        }
    }
}

/// Context selector payload.
///
/// `state` is `available`, `no_positions` or `unavailable`; the last one
/// means assignments could not be loaded and the selector should hide.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/available-contexts-response.ts"
)]
pub struct AvailableContextsResponse {
    pub state: &'static str,
    pub contexts: Vec<ContextResponse>,
}

impl AvailableContextsResponse {
    /// Payload used when the assignment source failed.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            state: "unavailable",
            contexts: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&ContextResponse> {
        self.contexts.iter().find(|context| context.is_current)
    }
}

impl From<&ContextAvailability> for AvailableContextsResponse {
    fn from(availability: &ContextAvailability) -> Self {
        match availability {
            ContextAvailability::NoPositions => Self {
                state: "no_positions",
                contexts: Vec::new(),
            },
            ContextAvailability::Available(contexts) => Self {
                state: "available",
                contexts: contexts.iter().map(ContextResponse::from).collect(),
            },
        }
    }
}

/// Current context and the capability it grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/current-context-response.ts"
)]
pub struct CurrentContextResponse {
    pub context: Option<ContextResponse>,
    pub capability: CapabilityResponse,
}

impl From<Option<Context>> for CurrentContextResponse {
    fn from(context: Option<Context>) -> Self {
        let capability = context
            .as_ref()
            .map(CapabilitySet::from_context)
            .unwrap_or_else(CapabilitySet::none);

        Self {
            context: context.as_ref().map(ContextResponse::from),
            capability: CapabilityResponse::from(capability),
        }
    }
}

/// Incoming payload for a context switch; `null` selects the combined context.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/switch-context-request.ts"
)]
pub struct SwitchContextRequest {
    #[serde(default)]
    pub assignment_id: Option<i64>,
}

/// Successful switch result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/switch-context-response.ts"
)]
pub struct SwitchContextResponse {
    pub success: bool,
    pub context: ContextResponse,
}

/// Rejected switch result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/switch-context-failure-response.ts"
)]
pub struct SwitchContextFailureResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Server-sent `context_changed` event payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/context-changed-event-response.ts"
)]
pub struct ContextChangedEventResponse {
    pub context: ContextResponse,
    pub capability: CapabilityResponse,
    pub changed_at: String,
}

impl From<&ContextChanged> for ContextChangedEventResponse {
    fn from(event: &ContextChanged) -> Self {
        Self {
            context: ContextResponse::from(&event.context),
            capability: CapabilityResponse::from(CapabilitySet::from_context(&event.context)),
            changed_at: event.changed_at.to_rfc3339(),
        }
    }
}
