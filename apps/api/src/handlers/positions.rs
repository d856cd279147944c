use axum::Json;
use axum::extract::{Extension, Query, State};
use presensi_application::ActorSession;
use presensi_core::EmployeeId;
use serde::Deserialize;

use crate::dto::PositionAssignmentResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignmentListQuery {
    pub employee_id: Option<i64>,
}

pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
    Query(query): Query<AssignmentListQuery>,
) -> ApiResult<Json<Vec<PositionAssignmentResponse>>> {
    let assignments = state
        .capability_service
        .list_assignments(&actor, query.employee_id.map(EmployeeId::new))
        .await?
        .into_iter()
        .map(PositionAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
