use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Json;
use axum::body::to_bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use futures_util::StreamExt;
use presensi_application::{
    ActorSession, ApprovalForwardRequest, ApprovalGateway, CapabilityService, ContextService,
    ContextSessionId, IdentityProvider, IdentityService,
};
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId, UserIdentity};
use presensi_domain::{
    ApprovalLevel, ApprovalPolicy, AssignmentId, DefaultContextPolicy, LegacyRoleLevels, Position,
    PositionAssignment, PositionAssignmentInput, PositionId,
};
use presensi_infrastructure::{
    BroadcastContextChangeNotifier, InMemoryContextSelectionStore,
    InMemoryPositionAssignmentRepository,
};
use serde_json::Value;
use tokio::sync::Mutex;

use super::approvals::{capabilities_handler, submit_approval_handler};
use super::context::{
    availability_response, available_contexts_handler, current_context_handler,
    session_events, switch_context_handler,
};
use super::health::health_handler;
use super::positions::{AssignmentListQuery, list_assignments_handler};
use crate::dto::{SubmitApprovalRequest, SwitchContextRequest};
use crate::state::AppState;

const EMPLOYEE: i64 = 77;

struct RejectingIdentityProvider;

#[async_trait]
impl IdentityProvider for RejectingIdentityProvider {
    async fn fetch_identity(&self, _access_token: &BackendAccessToken) -> AppResult<UserIdentity> {
        Err(AppError::Unauthorized("not used by handler tests".to_owned()))
    }
}

#[derive(Default)]
struct RecordingApprovalGateway {
    requests: Mutex<Vec<ApprovalForwardRequest>>,
}

#[async_trait]
impl ApprovalGateway for RecordingApprovalGateway {
    async fn forward_decision(
        &self,
        _access_token: &BackendAccessToken,
        request: ApprovalForwardRequest,
    ) -> AppResult<()> {
        self.requests.lock().await.push(request);
        Ok(())
    }
}

fn assignment(
    employee: i64,
    id: i64,
    name: &str,
    level: u8,
    org_wide: bool,
    primary: bool,
) -> PositionAssignment {
    PositionAssignment::new(PositionAssignmentInput {
        id: Some(AssignmentId::new(id)),
        employee_id: EmployeeId::new(employee),
        position: Position::new(
            PositionId::new(id + 100),
            name,
            ApprovalLevel::new(level),
            org_wide,
        )
        .unwrap_or_else(|_| unreachable!()),
        is_primary: primary,
        is_active: true,
        effective_from: Utc::now().date_naive() - chrono::Duration::days(5),
        effective_until: None,
    })
    .unwrap_or_else(|_| unreachable!())
}

fn actor(employee: i64, groups: &[&str]) -> ActorSession {
    ActorSession {
        session_id: ContextSessionId::new(),
        identity: UserIdentity::new(EmployeeId::new(employee), "sari", "Sari", None)
            .with_groups(groups.iter().map(|group| (*group).to_owned()).collect()),
        access_token: BackendAccessToken::new("token"),
    }
}

async fn test_state() -> (AppState, Arc<RecordingApprovalGateway>) {
    let repository = Arc::new(InMemoryPositionAssignmentRepository::new());
    repository
        .replace_assignments(vec![
            assignment(EMPLOYEE, 1, "Home Staff", 1, false, true),
            assignment(EMPLOYEE, 2, "PPK", 2, true, false),
            assignment(EMPLOYEE + 1, 30, "Kepala Divisi", 1, false, true),
        ])
        .await;
    let events = BroadcastContextChangeNotifier::new(16);
    let gateway = Arc::new(RecordingApprovalGateway::default());
    let context_service = ContextService::new(
        repository,
        Arc::new(InMemoryContextSelectionStore::new()),
        Arc::new(events.clone()),
        DefaultContextPolicy::Primary,
    );
    let capability_service = CapabilityService::new(
        context_service.clone(),
        gateway.clone(),
        ApprovalPolicy::default(),
        LegacyRoleLevels::default(),
    );

    (
        AppState {
            identity_service: IdentityService::new(Arc::new(RejectingIdentityProvider)),
            context_service,
            capability_service,
            context_events: events,
            frontend_url: "http://localhost:3000".to_owned(),
            session_backend: "memory",
        },
        gateway,
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&body).unwrap_or_default()
}

#[tokio::test]
async fn health_reports_session_backend() {
    let (state, _) = test_state().await;

    let response = health_handler(State(state)).await.into_response();

    let payload = json_body(response).await;
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["session_backend"], "memory");
}

#[tokio::test]
async fn available_contexts_lists_positions_and_combined() {
    let (state, _) = test_state().await;

    let response = available_contexts_handler(State(state), Extension(actor(EMPLOYEE, &[])))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["state"], "available");
    assert_eq!(payload["contexts"][0]["display_name"], "Home Staff");
    assert_eq!(payload["contexts"][0]["is_current"], true);
    assert_eq!(payload["contexts"][2]["display_name"], "Combined");
}

#[tokio::test]
async fn employee_without_positions_gets_no_positions_state() {
    let (state, _) = test_state().await;

    let response = available_contexts_handler(State(state), Extension(actor(500, &[])))
        .await
        .into_response();

    let payload = json_body(response).await;
    assert_eq!(payload["state"], "no_positions");
    assert_eq!(payload["contexts"].as_array().map(Vec::len), Some(0));
}

#[test]
fn upstream_failure_hides_selector_instead_of_failing() {
    let response = availability_response(
        &actor(EMPLOYEE, &[]),
        Err(AppError::UpstreamUnavailable("timeout".to_owned())),
    );

    assert!(matches!(response, Ok(ref value) if value.state == "unavailable"));
}

#[tokio::test]
async fn switching_to_foreign_assignment_returns_invalid_context() {
    let (state, _) = test_state().await;

    let response = switch_context_handler(
        State(state),
        Extension(actor(EMPLOYEE, &[])),
        Json(SwitchContextRequest {
            assignment_id: Some(30),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["error"], "InvalidContext");
}

#[tokio::test]
async fn switch_updates_current_context_and_capability() {
    let (state, _) = test_state().await;
    let session = actor(EMPLOYEE, &[]);

    let switched = switch_context_handler(
        State(state.clone()),
        Extension(session.clone()),
        Json(SwitchContextRequest {
            assignment_id: Some(2),
        }),
    )
    .await;
    assert_eq!(switched.status(), StatusCode::OK);
    let switched = json_body(switched).await;
    assert_eq!(switched["success"], true);
    assert_eq!(switched["context"]["display_name"], "PPK");

    let current = current_context_handler(State(state), Extension(session))
        .await
        .into_response();
    let current = json_body(current).await;
    assert_eq!(current["context"]["assignment_id"], 2);
    assert_eq!(current["capability"]["approval_level"], 2);
    assert_eq!(current["capability"]["can_approve_org_wide"], true);
}

#[tokio::test]
async fn event_stream_only_delivers_own_session_changes() {
    let (state, _) = test_state().await;
    let own = actor(EMPLOYEE, &[]);
    let other = actor(EMPLOYEE, &[]);
    let mut own_events = pin!(session_events(state.context_events.subscribe(), own.session_id));

    let other_switch = switch_context_handler(
        State(state.clone()),
        Extension(other),
        Json(SwitchContextRequest { assignment_id: None }),
    )
    .await;
    assert_eq!(other_switch.status(), StatusCode::OK);

    let nothing = tokio::time::timeout(Duration::from_millis(50), own_events.next()).await;
    assert!(nothing.is_err());

    let own_switch = switch_context_handler(
        State(state),
        Extension(own),
        Json(SwitchContextRequest {
            assignment_id: Some(2),
        }),
    )
    .await;
    assert_eq!(own_switch.status(), StatusCode::OK);

    let delivered = tokio::time::timeout(Duration::from_millis(500), own_events.next()).await;
    assert!(matches!(delivered, Ok(Some(Ok(_)))));
}

#[tokio::test]
async fn capabilities_follow_current_context() {
    let (state, _) = test_state().await;

    let response = capabilities_handler(State(state), Extension(actor(EMPLOYEE, &[])))
        .await
        .into_response();

    let payload = json_body(response).await;
    assert_eq!(payload["capability"]["approval_level"], 1);
    let permissions = payload["permissions"].as_array().cloned().unwrap_or_default();
    assert_eq!(permissions.len(), 6);
    assert!(permissions.iter().all(|permission| {
        (permission["scope"] == "division") == (permission["permitted"] == true)
    }));
}

#[tokio::test]
async fn organization_decision_is_forbidden_in_home_context() {
    let (state, gateway) = test_state().await;

    let response = submit_approval_handler(
        State(state),
        Extension(actor(EMPLOYEE, &[])),
        Path(("leave".to_owned(), 91)),
        Json(SubmitApprovalRequest {
            decision: "approve".to_owned(),
            scope: "organization".to_owned(),
            note: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(gateway.requests.lock().await.is_empty());
}

#[tokio::test]
async fn division_decision_is_forwarded() {
    let (state, gateway) = test_state().await;

    let response = submit_approval_handler(
        State(state),
        Extension(actor(EMPLOYEE, &[])),
        Path(("attendance_correction".to_owned(), 92)),
        Json(SubmitApprovalRequest {
            decision: "reject".to_owned(),
            scope: "division".to_owned(),
            note: Some("  ".to_owned()),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let requests = gateway.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].record_id, 92);
    assert_eq!(requests[0].acting_assignment_id, Some(AssignmentId::new(1)));
    assert!(requests[0].note.is_none());
}

#[tokio::test]
async fn unknown_operation_is_a_validation_error() {
    let (state, _) = test_state().await;

    let response = submit_approval_handler(
        State(state),
        Extension(actor(EMPLOYEE, &[])),
        Path(("expense".to_owned(), 93)),
        Json(SubmitApprovalRequest {
            decision: "approve".to_owned(),
            scope: "division".to_owned(),
            note: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assignment_listing_is_scoped_to_self_unless_admin() {
    let (state, _) = test_state().await;

    let denied = list_assignments_handler(
        State(state.clone()),
        Extension(actor(EMPLOYEE, &[])),
        Query(AssignmentListQuery {
            employee_id: Some(EMPLOYEE + 1),
        }),
    )
    .await
    .into_response();
    let allowed = list_assignments_handler(
        State(state),
        Extension(actor(9, &["admin"])),
        Query(AssignmentListQuery {
            employee_id: Some(EMPLOYEE + 1),
        }),
    )
    .await
    .into_response();

    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    assert_eq!(allowed.status(), StatusCode::OK);
    let payload = json_body(allowed).await;
    assert_eq!(payload[0]["position_name"], "Kepala Divisi");
}
