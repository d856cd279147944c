use serde::Serialize;
use ts_rs::TS;

/// Liveness payload; `session_backend` names where selections are kept.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub session_backend: &'static str,
}
