use std::sync::Arc;

use presensi_core::{AppResult, BackendAccessToken, UserIdentity};
use tracing::info;

use crate::IdentityProvider;


/// Application service that turns backend tokens into portal identities.
#[derive(Clone)]
pub struct IdentityService {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityService {
    /// Creates an identity service.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Validates a backend token and returns the actor it belongs to.
    pub async fn authenticate(&self, access_token: &BackendAccessToken) -> AppResult<UserIdentity> {
        let identity = self.provider.fetch_identity(access_token).await?;
        info!(
            employee_id = %identity.employee_id(),
            username = identity.username(),
            "backend token accepted"
        );

        Ok(identity)
    }
}
