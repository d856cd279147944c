use async_trait::async_trait;
use presensi_core::{AppResult, BackendAccessToken, UserIdentity};

/// Port to the backend's `GET /auth/me` profile endpoint.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the actor owning a backend access token.
    ///
    /// Returns `AppError::Unauthorized` when the backend rejects the token.
    async fn fetch_identity(&self, access_token: &BackendAccessToken) -> AppResult<UserIdentity>;
}
