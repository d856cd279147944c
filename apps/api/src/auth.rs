use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use presensi_application::{ActorSession, ContextSessionId};
use presensi_core::{AppError, BackendAccessToken};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::{
    CreateSessionRequest, LandingResponse, MeResponse, SessionResponse, UserIdentityResponse,
};
use crate::error::ApiResult;
use crate::handlers::context::availability_response;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";
pub const SESSION_TOKEN_KEY: &str = "backend_access_token";
/// Key of the server-minted id scoping the session's context selection.
pub const SESSION_CONTEXT_KEY: &str = "context_session_id";

pub async fn create_session_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let token = payload.access_token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("access_token must not be empty".to_owned()).into());
    }

    let access_token = BackendAccessToken::new(token);
    let identity = state.identity_service.authenticate(&access_token).await?;

    let previous_context = session
        .get::<ContextSessionId>(SESSION_CONTEXT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read context session id: {error}"))
        })?;
    if let Some(previous_context) = previous_context {
        end_context_session(&state, previous_context).await;
    }

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    let actor = ActorSession {
        session_id: ContextSessionId::new(),
        identity,
        access_token,
    };
    let landing = state.capability_service.resolve_landing(&actor).await?;

    session
        .insert(SESSION_USER_KEY, &actor.identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;
    session
        .insert(SESSION_TOKEN_KEY, &actor.access_token)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session token: {error}")))?;
    session
        .insert(SESSION_CONTEXT_KEY, actor.session_id)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist context session id: {error}"))
        })?;

    info!(
        employee_id = %actor.employee_id(),
        context_session_id = %actor.session_id,
        surface = landing.surface.as_str(),
        capability_degraded = landing.capability_degraded,
        "portal session started"
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user: UserIdentityResponse::from_identity(
                &actor.identity,
                state.capability_service.is_admin(&actor),
            ),
            landing: LandingResponse::from(landing),
        }),
    ))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    let context_session = session
        .get::<ContextSessionId>(SESSION_CONTEXT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read context session id: {error}"))
        })?;
    if let Some(context_session) = context_session {
        end_context_session(&state, context_session).await;
    }

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> ApiResult<Json<MeResponse>> {
    let landing = state.capability_service.resolve_landing(&actor).await?;
    let available_contexts = availability_response(
        &actor,
        state.context_service.available_contexts(&actor).await,
    )?;
    let current_context = available_contexts.current().cloned();

    Ok(Json(MeResponse {
        user: UserIdentityResponse::from_identity(
            &actor.identity,
            state.capability_service.is_admin(&actor),
        ),
        available_contexts,
        current_context,
        landing: LandingResponse::from(landing),
    }))
}

pub async fn landing_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorSession>,
) -> ApiResult<Json<LandingResponse>> {
    let landing = state.capability_service.resolve_landing(&actor).await?;
    Ok(Json(LandingResponse::from(landing)))
}

async fn end_context_session(state: &AppState, session_id: ContextSessionId) {
    if let Err(error) = state.context_service.end_session(session_id).await {
        warn!(context_session_id = %session_id, %error, "failed to drop context selection");
    }
}
