use presensi_core::AppError;

pub fn build_redis_client(redis_url: &str) -> Result<redis::Client, AppError> {
    redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))
}

/// Fails startup early when Redis is configured but unreachable.
pub async fn ping_redis(client: &redis::Client) -> Result<(), AppError> {
    let mut connection = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|error| AppError::UpstreamUnavailable(format!("redis unreachable: {error}")))?;

    redis::cmd("PING")
        .query_async::<String>(&mut connection)
        .await
        .map(|_| ())
        .map_err(|error| AppError::UpstreamUnavailable(format!("redis ping failed: {error}")))
}
