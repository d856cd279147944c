use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use presensi_application::{ActorSession, SubmitApprovalInput};
use presensi_domain::{ApprovalDecision, ApprovalOperation, ApprovalScope};

use crate::dto::{CapabilityOverviewResponse, SubmitApprovalRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn capabilities_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> ApiResult<Json<CapabilityOverviewResponse>> {
    let overview = state.capability_service.capability_overview(&actor).await?;
    Ok(Json(CapabilityOverviewResponse::from(overview)))
}

pub async fn submit_approval_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
    Path((operation, record_id)): Path<(String, i64)>,
    Json(payload): Json<SubmitApprovalRequest>,
) -> ApiResult<StatusCode> {
    let input = SubmitApprovalInput {
        operation: ApprovalOperation::from_str(operation.as_str())?,
        record_id,
        decision: ApprovalDecision::from_str(payload.decision.as_str())?,
        scope: ApprovalScope::from_str(payload.scope.as_str())?,
        note: payload
            .note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty()),
    };

    state
        .capability_service
        .submit_decision(&actor, input)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
