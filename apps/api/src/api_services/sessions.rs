use presensi_core::AppError;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::redis_session_store::RedisSessionStore;

const SESSION_COOKIE_NAME: &str = "presensi_session";

pub async fn build_postgres_session_layer(
    pool: PgPool,
    cookie_secure: bool,
    inactivity_minutes: i64,
) -> Result<SessionManagerLayer<PostgresStore>, AppError> {
    let session_store = PostgresStore::new(pool)
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;

    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    Ok(configure(session_store, cookie_secure, inactivity_minutes))
}

pub fn build_redis_session_layer(
    redis_client: redis::Client,
    cookie_secure: bool,
    inactivity_minutes: i64,
) -> SessionManagerLayer<RedisSessionStore> {
    configure(
        RedisSessionStore::new(redis_client, "presensi:session"),
        cookie_secure,
        inactivity_minutes,
    )
}

/// Process-local sessions for development; every restart signs users out.
pub fn build_memory_session_layer(
    cookie_secure: bool,
    inactivity_minutes: i64,
) -> SessionManagerLayer<MemoryStore> {
    configure(MemoryStore::default(), cookie_secure, inactivity_minutes)
}

fn configure<S>(
    session_store: S,
    cookie_secure: bool,
    inactivity_minutes: i64,
) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(inactivity_minutes)))
}
