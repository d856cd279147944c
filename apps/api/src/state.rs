use presensi_application::{CapabilityService, ContextService, IdentityService};
use presensi_infrastructure::BroadcastContextChangeNotifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub context_service: ContextService,
    pub capability_service: CapabilityService,
    pub context_events: BroadcastContextChangeNotifier,
    pub frontend_url: String,
    pub session_backend: &'static str,
}
