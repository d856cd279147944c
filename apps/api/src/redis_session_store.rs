use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tower_sessions::SessionStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, Error as SessionStoreError};


/// Session store keeping cookie sessions in Redis, one key per session.
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSessionStore {
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, session_id: &Id) -> String {
        format!("{}:{}", self.key_prefix, session_id)
    }

    async fn connection(&self) -> session_store::Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)
    }
}

/// Seconds until the record expires; `None` once it already has.
fn remaining_ttl_seconds(record: &Record, now_unix: i64) -> Option<u64> {
    u64::try_from(record.expiry_date.unix_timestamp() - now_unix)
        .ok()
        .filter(|seconds| *seconds > 0)
}

fn encode_record(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|error| SessionStoreError::Encode(error.to_string()))
}

fn decode_record(payload: &str) -> session_store::Result<Record> {
    serde_json::from_str(payload).map_err(|error| SessionStoreError::Decode(error.to_string()))
}

fn backend_error(error: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(error.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, session_record: &mut Record) -> session_store::Result<()> {
        let Some(ttl_seconds) = remaining_ttl_seconds(session_record, Utc::now().timestamp())
        else {
            return Ok(());
        };

        let mut connection = self.connection().await?;
        loop {
            let stored: Option<String> = redis::cmd("SET")
                .arg(self.key_for(&session_record.id))
                .arg(encode_record(session_record)?)
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds)
                .query_async(&mut connection)
                .await
                .map_err(backend_error)?;

            if stored.is_some() {
                return Ok(());
            }

            session_record.id = Id::default();
        }
    }

    async fn save(&self, session_record: &Record) -> session_store::Result<()> {
        let key = self.key_for(&session_record.id);
        let mut connection = self.connection().await?;

        match remaining_ttl_seconds(session_record, Utc::now().timestamp()) {
            Some(ttl_seconds) => connection
                .set_ex::<_, _, ()>(key, encode_record(session_record)?, ttl_seconds)
                .await
                .map_err(backend_error),
            None => connection
                .del::<_, ()>(key)
                .await
                .map_err(backend_error),
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut connection = self.connection().await?;
        let payload: Option<String> = connection
            .get(self.key_for(session_id))
            .await
            .map_err(backend_error)?;

        payload.as_deref().map(decode_record).transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(self.key_for(session_id))
            .await
            .map_err(backend_error)
    }
}
