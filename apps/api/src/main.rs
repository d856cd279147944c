//! Presensi API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod redis_session_store;
mod state;

use std::sync::Arc;

use presensi_application::ContextSelectionStore;
use presensi_core::AppError;
use presensi_infrastructure::{
    InMemoryContextSelectionStore, PostgresContextSelectionStore, RedisContextSelectionStore,
};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, SessionBackendConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let backend_client = api_services::build_backend_client(&config)?;

    match &config.session_backend {
        SessionBackendConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = api_services::connect_and_migrate(database_url, *max_connections).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            let selection_store = PostgresContextSelectionStore::new(
                pool.clone(),
                chrono::Duration::minutes(config.session_inactivity_minutes),
            );
            match selection_store.purge_expired().await {
                Ok(purged) => info!(purged, "expired context selections purged"),
                Err(error) => warn!(%error, "failed to purge expired context selections"),
            }

            let session_layer = api_services::build_postgres_session_layer(
                pool,
                config.cookie_secure,
                config.session_inactivity_minutes,
            )
            .await?;
            let app_state =
                api_services::build_app_state(&config, backend_client, Arc::new(selection_store));
            serve(&config, app_state, session_layer).await
        }
        SessionBackendConfig::Redis { redis_url } => {
            let redis_client = api_services::build_redis_client(redis_url)?;
            api_services::ping_redis(&redis_client).await?;
            let selection_store: Arc<dyn ContextSelectionStore> =
                Arc::new(RedisContextSelectionStore::new(
                    redis_client.clone(),
                    "presensi:context",
                    config.session_ttl_seconds(),
                ));
            let session_layer = api_services::build_redis_session_layer(
                redis_client,
                config.cookie_secure,
                config.session_inactivity_minutes,
            );
            let app_state = api_services::build_app_state(&config, backend_client, selection_store);
            serve(&config, app_state, session_layer).await
        }
        SessionBackendConfig::Memory => {
            warn!("using in-memory sessions; sign-ins do not survive restarts");
            let session_layer = api_services::build_memory_session_layer(
                config.cookie_secure,
                config.session_inactivity_minutes,
            );
            let app_state = api_services::build_app_state(
                &config,
                backend_client,
                Arc::new(InMemoryContextSelectionStore::new()),
            );
            serve(&config, app_state, session_layer).await
        }
    }
}

async fn serve<S>(
    config: &ApiConfig,
    app_state: AppState,
    session_layer: SessionManagerLayer<S>,
) -> Result<(), AppError>
where
    S: SessionStore + Clone,
{
    let app = api_router::build_router(app_state, session_layer)?;
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        backend = %config.backend_base_url,
        session_backend = config.session_backend.as_str(),
        default_context = config.default_context_policy.as_str(),
        "presensi-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
