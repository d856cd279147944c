use std::convert::Infallible;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::Stream;
use presensi_application::{ActorSession, ContextAvailability, ContextChanged, ContextSessionId};
use presensi_core::{AppError, AppResult};
use presensi_domain::AssignmentId;
use tokio::sync::broadcast;
use tracing::warn;

use crate::dto::{
    AvailableContextsResponse, ContextChangedEventResponse, ContextResponse,
    CurrentContextResponse, SwitchContextFailureResponse, SwitchContextRequest,
    SwitchContextResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn available_contexts_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> ApiResult<Json<AvailableContextsResponse>> {
    let availability = state.context_service.available_contexts(&actor).await;
    Ok(Json(availability_response(&actor, availability)?))
}

/// Maps resolved contexts for the selector; an unreachable backend hides the
/// selector instead of failing the page.
pub fn availability_response(
    actor: &ActorSession,
    availability: AppResult<ContextAvailability>,
) -> ApiResult<AvailableContextsResponse> {
    match availability {
        Ok(availability) => Ok(AvailableContextsResponse::from(&availability)),
        Err(AppError::UpstreamUnavailable(message)) => {
            warn!(
                employee_id = %actor.employee_id(),
                error = %message,
                "position assignments unavailable, hiding context selector"
            );
            Ok(AvailableContextsResponse::unavailable())
        }
        Err(error) => Err(error.into()),
    }
}

pub async fn current_context_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> ApiResult<Json<CurrentContextResponse>> {
    let context = state.context_service.current_context(&actor).await?;
    Ok(Json(CurrentContextResponse::from(context)))
}

pub async fn switch_context_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
    Json(payload): Json<SwitchContextRequest>,
) -> Response {
    let requested = payload.assignment_id.map(AssignmentId::new);

    match state.context_service.switch_context(&actor, requested).await {
        Ok(context) => (
            StatusCode::OK,
            Json(SwitchContextResponse {
                success: true,
                context: ContextResponse::from(&context),
            }),
        )
            .into_response(),
        Err(error @ AppError::InvalidContext(_)) => {
            warn!(
                employee_id = %actor.employee_id(),
                assignment_id = ?payload.assignment_id,
                %error,
                "context switch rejected"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(SwitchContextFailureResponse {
                    success: false,
                    error: error.kind().to_owned(),
                    message: error.to_string(),
                }),
            )
                .into_response()
        }
        Err(error) => ApiError(error).into_response(),
    }
}

pub async fn context_events_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(session_events(state.context_events.subscribe(), actor.session_id))
        .keep_alive(KeepAlive::default())
}

/// Streams the changes of one context session; lagging subscribers get a
/// `context_resync` event and should refetch.
pub fn session_events(
    receiver: broadcast::Receiver<ContextChanged>,
    session_id: ContextSessionId,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures_util::stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if event.session_id == session_id => {
                    return Some((Ok(context_changed_event(&event)), receiver));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        context_session_id = %session_id,
                        skipped,
                        "context event stream lagged"
                    );
                    return Some((Ok(resync_event()), receiver));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}

fn context_changed_event(event: &ContextChanged) -> Event {
    let payload = ContextChangedEventResponse::from(event);
    Event::default()
        .event("context_changed")
        .json_data(&payload)
        .unwrap_or_else(|error| {
            warn!(%error, "failed to encode context change event");
            resync_event()
        })
}

fn resync_event() -> Event {
    Event::default().event("context_resync").data("{}")
}
