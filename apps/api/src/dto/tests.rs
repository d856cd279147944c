use chrono::{Duration, Utc};
use presensi_application::{ContextAvailability, LandingResolution};
use presensi_core::EmployeeId;
use presensi_domain::{
    ApprovalLevel, AssignmentId, LandingSurface, Position, PositionAssignment,
    PositionAssignmentInput, PositionId, resolve_with_selected,
};
use serde_json::{Value, json};

use super::{
    AvailableContextsResponse, CurrentContextResponse, LandingResponse,
    PositionAssignmentResponse, SwitchContextRequest,
};

fn assignment(
    id: i64,
    name: &str,
    level: u8,
    org_wide: bool,
    primary: bool,
) -> PositionAssignment {
    PositionAssignment::new(PositionAssignmentInput {
        id: Some(AssignmentId::new(id)),
        employee_id: EmployeeId::new(77),
        position: Position::new(
            PositionId::new(id + 100),
            name,
            ApprovalLevel::new(level),
            org_wide,
        )
        .unwrap_or_else(|_| unreachable!()),
        is_primary: primary,
        is_active: true,
        effective_from: Utc::now().date_naive() - Duration::days(10),
        effective_until: None,
    })
    .unwrap_or_else(|_| unreachable!())
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

#[test]
fn available_contexts_serialise_with_state_and_combined_entry() {
    let contexts = resolve_with_selected(
        &[
            assignment(1, "Home Staff", 1, false, true),
            assignment(2, "PPK", 2, true, false),
        ],
        EmployeeId::new(77),
        Some(AssignmentId::new(2)),
        Utc::now().date_naive(),
    );
    let response = AvailableContextsResponse::from(&ContextAvailability::Available(contexts));

    let payload = to_json(&response);

    assert_eq!(payload["state"], "available");
    assert_eq!(payload["contexts"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["contexts"][1]["assignment_id"], 2);
    assert_eq!(payload["contexts"][1]["is_current"], true);
    assert_eq!(payload["contexts"][2]["assignment_id"], Value::Null);
    assert_eq!(payload["contexts"][2]["display_name"], "Combined");
    assert_eq!(payload["contexts"][2]["is_combined"], true);
    assert_eq!(
        response.current().and_then(|context| context.assignment_id),
        Some(2)
    );
}

#[test]
fn no_positions_is_distinct_from_unavailable() {
    let no_positions = to_json(&AvailableContextsResponse::from(
        &ContextAvailability::NoPositions,
    ));
    let unavailable = to_json(&AvailableContextsResponse::unavailable());

    assert_eq!(no_positions, json!({"state": "no_positions", "contexts": []}));
    assert_eq!(unavailable, json!({"state": "unavailable", "contexts": []}));
}

#[test]
fn current_context_without_positions_has_no_capability() {
    let payload = to_json(&CurrentContextResponse::from(None));

    assert_eq!(payload["context"], Value::Null);
    assert_eq!(payload["capability"]["approval_level"], 0);
    assert_eq!(payload["capability"]["can_approve_org_wide"], false);
}

#[test]
fn switch_request_treats_missing_and_null_as_combined() {
    let missing: Option<SwitchContextRequest> = serde_json::from_value(json!({})).ok();
    let null: Option<SwitchContextRequest> =
        serde_json::from_value(json!({"assignment_id": null})).ok();
    let selected: Option<SwitchContextRequest> =
        serde_json::from_value(json!({"assignment_id": 12})).ok();

    assert_eq!(missing.and_then(|request| request.assignment_id), None);
    assert_eq!(null.and_then(|request| request.assignment_id), None);
    assert_eq!(selected.and_then(|request| request.assignment_id), Some(12));
}

#[test]
fn landing_response_carries_surface_path() {
    let payload = to_json(&LandingResponse::from(LandingResolution {
        surface: LandingSurface::Supervisor,
        approval_level: ApprovalLevel::DIVISION,
        capability_degraded: true,
    }));

    assert_eq!(payload["surface"], "supervisor");
    assert_eq!(payload["path"], "/supervisor");
    assert_eq!(payload["approval_level"], 1);
    assert_eq!(payload["capability_degraded"], true);
}

#[test]
fn assignment_response_flattens_position() {
    let payload = to_json(&PositionAssignmentResponse::from(assignment(
        2, "PPK", 2, true, false,
    )));

    assert_eq!(payload["id"], 2);
    assert_eq!(payload["position_id"], 102);
    assert_eq!(payload["position_name"], "PPK");
    assert_eq!(payload["can_approve_org_wide"], true);
    assert_eq!(payload["effective_until"], Value::Null);
}
