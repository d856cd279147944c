use std::sync::Arc;

use presensi_application::{
    CapabilityService, ContextSelectionStore, ContextService, IdentityService,
};
use presensi_core::AppError;
use presensi_infrastructure::{
    BackendClient, BroadcastContextChangeNotifier, HttpApprovalGateway, HttpIdentityProvider,
    HttpPositionAssignmentRepository,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_backend_client(config: &ApiConfig) -> Result<BackendClient, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.backend_timeout)
        .build()
        .map_err(|error| {
            AppError::Internal(format!("failed to build backend http client: {error}"))
        })?;

    Ok(BackendClient::new(
        http_client,
        config.backend_base_url.clone(),
    ))
}

pub fn build_app_state(
    config: &ApiConfig,
    backend_client: BackendClient,
    selection_store: Arc<dyn ContextSelectionStore>,
) -> AppState {
    let context_events = BroadcastContextChangeNotifier::new(config.context_event_capacity);
    let context_service = ContextService::new(
        Arc::new(HttpPositionAssignmentRepository::new(backend_client.clone())),
        selection_store,
        Arc::new(context_events.clone()),
        config.default_context_policy,
    );
    let capability_service = CapabilityService::new(
        context_service.clone(),
        Arc::new(HttpApprovalGateway::new(backend_client.clone())),
        config.approval_policy,
        config.role_levels.clone(),
    );

    AppState {
        identity_service: IdentityService::new(Arc::new(HttpIdentityProvider::new(
            backend_client,
        ))),
        context_service,
        capability_service,
        context_events,
        frontend_url: config.frontend_url.clone(),
        session_backend: config.session_backend.as_str(),
    }
}
