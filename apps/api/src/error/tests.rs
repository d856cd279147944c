use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use presensi_core::AppError;
use serde_json::Value;

use super::{ApiError, status_for};

#[test]
fn context_and_upstream_errors_map_to_their_statuses() {
    assert_eq!(
        status_for(&AppError::InvalidContext("stale".to_owned())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_for(&AppError::UpstreamUnavailable("down".to_owned())),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_for(&AppError::Unauthorized("expired".to_owned())),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status_for(&AppError::Forbidden("level".to_owned())),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn error_body_carries_stable_kind() {
    let response =
        ApiError(AppError::InvalidContext("assignment '9' is not active".to_owned())).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let payload: Value = serde_json::from_slice(&body).unwrap_or_default();

    assert_eq!(payload["error"], "InvalidContext");
    assert!(
        payload["message"]
            .as_str()
            .is_some_and(|message| message.contains("assignment '9'"))
    );
}

#[tokio::test]
async fn unauthorized_is_reported_as_unauthenticated() {
    let response = ApiError(AppError::Unauthorized("authentication required".to_owned()))
        .into_response();

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let payload: Value = serde_json::from_slice(&body).unwrap_or_default();

    assert_eq!(payload["error"], "Unauthenticated");
}
