use presensi_application::LandingResolution;
use presensi_core::UserIdentity;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{AvailableContextsResponse, ContextResponse};

/// Incoming payload adopting a backend token into a portal session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-session-request.ts"
)]
pub struct CreateSessionRequest {
    pub access_token: String,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub employee_id: i64,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub groups: Vec<String>,
    pub is_superuser: bool,
    pub is_admin: bool,
}

impl UserIdentityResponse {
    /// Creates a response from the identity and its admin-surface membership.
    #[must_use]
    pub fn from_identity(identity: &UserIdentity, is_admin: bool) -> Self {
        Self {
            employee_id: identity.employee_id().as_i64(),
            username: identity.username().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            groups: identity.groups().to_vec(),
            is_superuser: identity.is_superuser(),
            is_admin,
        }
    }
}

/// Where the portal sends the user after sign-in.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/landing-response.ts"
)]
pub struct LandingResponse {
    pub surface: &'static str,
    pub path: &'static str,
    pub approval_level: u8,
    /// Position data was unavailable; routing used group membership only.
    pub capability_degraded: bool,
}

impl From<LandingResolution> for LandingResponse {
    fn from(landing: LandingResolution) -> Self {
        Self {
            surface: landing.surface.as_str(),
            path: landing.surface.path(),
            approval_level: landing.approval_level.as_u8(),
            capability_degraded: landing.capability_degraded,
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub user: UserIdentityResponse,
    pub landing: LandingResponse,
}

/// Authenticated user with the context data the shell renders.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/me-response.ts"
)]
pub struct MeResponse {
    pub user: UserIdentityResponse,
    pub available_contexts: AvailableContextsResponse,
    pub current_context: Option<ContextResponse>,
    pub landing: LandingResponse,
}
