//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod backend_client;
mod broadcast_context_change_notifier;
mod http_approval_gateway;
mod http_identity_provider;
mod http_position_assignment_repository;
mod in_memory_context_selection_store;
mod in_memory_position_assignment_repository;
mod postgres_context_selection_store;
mod redis_context_selection_store;

pub use backend_client::BackendClient;
pub use broadcast_context_change_notifier::BroadcastContextChangeNotifier;
pub use http_approval_gateway::HttpApprovalGateway;
pub use http_identity_provider::HttpIdentityProvider;
pub use http_position_assignment_repository::HttpPositionAssignmentRepository;
pub use in_memory_context_selection_store::InMemoryContextSelectionStore;
pub use in_memory_position_assignment_repository::InMemoryPositionAssignmentRepository;
pub use postgres_context_selection_store::PostgresContextSelectionStore;
pub use redis_context_selection_store::RedisContextSelectionStore;
