use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use presensi_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router<S>(
    app_state: AppState,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let cors_layer = cors::build_cors_layer(app_state.frontend_url.as_str())?;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::create_session_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/landing", get(auth::landing_handler))
        .route(
            "/context/available",
            get(handlers::context::available_contexts_handler),
        )
        .route(
            "/context/current",
            get(handlers::context::current_context_handler),
        )
        .route(
            "/context/switch",
            post(handlers::context::switch_context_handler),
        )
        .route(
            "/context/events",
            get(handlers::context::context_events_handler),
        )
        .route(
            "/api/positions/assignments",
            get(handlers::positions::list_assignments_handler),
        )
        .route(
            "/api/approvals/capabilities",
            get(handlers::approvals::capabilities_handler),
        )
        .route(
            "/api/approvals/{operation}/{record_id}",
            post(handlers::approvals::submit_approval_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
