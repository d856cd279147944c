//! Redis-backed context selection store.

use async_trait::async_trait;
use presensi_application::{ContextSelectionStore, ContextSessionId};
use presensi_core::{AppError, AppResult};
use presensi_domain::ActiveContextSelection;
use redis::AsyncCommands;

/// Redis implementation of the selection store port.
///
/// Keys expire with the session inactivity window and every access renews it.
#[derive(Clone)]
pub struct RedisContextSelectionStore {
    client: redis::Client,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisContextSelectionStore {
    /// Creates a store with a configured Redis client, key prefix and key lifetime.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    fn key_for(&self, session_id: ContextSessionId) -> String {
        format!("{}:{session_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

fn encode(selection: &ActiveContextSelection) -> AppResult<String> {
    serde_json::to_string(selection).map_err(|error| {
        AppError::Internal(format!("failed to encode context selection: {error}"))
    })
}

fn decode(payload: Option<String>) -> AppResult<Option<ActiveContextSelection>> {
    payload
        .map(|payload| {
            serde_json::from_str(payload.as_str()).map_err(|error| {
                AppError::Internal(format!("failed to decode context selection: {error}"))
            })
        })
        .transpose()
}

#[async_trait]
impl ContextSelectionStore for RedisContextSelectionStore {
    async fn find_selection(
        &self,
        session_id: ContextSessionId,
    ) -> AppResult<Option<ActiveContextSelection>> {
        let mut connection = self.connection().await?;
        let payload: Option<String> = redis::cmd("GETEX")
            .arg(self.key_for(session_id))
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load context selection: {error}"))
            })?;

        decode(payload)
    }

    async fn initialize_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<ActiveContextSelection> {
        let payload = encode(&selection)?;
        let mut connection = self.connection().await?;
        let stored: Option<String> = redis::cmd("SET")
            .arg(self.key_for(session_id))
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to initialise context selection: {error}"))
            })?;

        if stored.is_some() {
            return Ok(selection);
        }

        self.find_selection(session_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "context selection for session '{session_id}' vanished after initialisation"
            ))
        })
    }

    async fn save_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<()> {
        let payload = encode(&selection)?;
        let mut connection = self.connection().await?;
        connection
            .set_ex::<_, _, ()>(self.key_for(session_id), payload, self.ttl_seconds)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to save context selection: {error}"))
            })?;

        Ok(())
    }

    async fn delete_selection(&self, session_id: ContextSessionId) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(self.key_for(session_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete context selection: {error}"))
            })?;

        Ok(())
    }
}
