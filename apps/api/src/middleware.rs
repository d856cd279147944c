use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use presensi_application::{ActorSession, ContextSessionId};
use presensi_core::{AppError, BackendAccessToken, UserIdentity};
use tower_sessions::Session;

use crate::auth::{SESSION_CONTEXT_KEY, SESSION_TOKEN_KEY, SESSION_USER_KEY};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let actor = actor_from_session(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(actor.identity.clone());
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Rebuilds the actor stored by sign-in; `None` when any part is missing.
pub async fn actor_from_session(session: &Session) -> ApiResult<Option<ActorSession>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;
    let access_token = session
        .get::<BackendAccessToken>(SESSION_TOKEN_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session token: {error}")))?;
    let session_id = session
        .get::<ContextSessionId>(SESSION_CONTEXT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read context session id: {error}"))
        })?;

    Ok(match (identity, access_token, session_id) {
        (Some(identity), Some(access_token), Some(session_id)) => Some(ActorSession {
            session_id,
            identity,
            access_token,
        }),
        _ => None,
    })
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
            return Err(AppError::Forbidden("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok());

        if !is_same_origin(state.frontend_url.as_str(), origin, referer) {
            return Err(AppError::Forbidden("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Accepts a mutation when its `Origin` matches, or when it has no `Origin`
/// and its `Referer` lies under the frontend URL.
pub fn is_same_origin(frontend_url: &str, origin: Option<&str>, referer: Option<&str>) -> bool {
    let frontend_url = frontend_url.trim_end_matches('/');

    match origin {
        Some(origin) => origin.trim_end_matches('/') == frontend_url,
        None => referer.is_some_and(|referer| {
            referer == frontend_url
                || referer
                    .strip_prefix(frontend_url)
                    .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
        }),
    }
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
