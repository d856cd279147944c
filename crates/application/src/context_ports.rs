use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId, UserIdentity};
use presensi_domain::{ActiveContextSelection, Context, PositionAssignment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-minted key that scopes one session's context selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSessionId(Uuid);

impl ContextSessionId {
    /// Mints a fresh random key.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a key from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a key from its hyphenated string form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid context session id: {error}")))
    }
}

impl Default for ContextSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ContextSessionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Read access to the backend-owned position assignment table.
#[async_trait]
pub trait PositionAssignmentRepository: Send + Sync {
    /// Lists the assignments the backend holds for an employee.
    ///
    /// Implementations may return inactive or expired rows; callers filter.
    async fn list_assignments_for_employee(
        &self,
        access_token: &BackendAccessToken,
        employee_id: EmployeeId,
    ) -> AppResult<Vec<PositionAssignment>>;
}

/// Session-scoped storage for the active context selection.
///
/// Every write replaces the whole selection in one operation so readers never
/// observe a partially updated value.
#[async_trait]
pub trait ContextSelectionStore: Send + Sync {
    /// Loads the selection stored for a session.
    async fn find_selection(
        &self,
        session_id: ContextSessionId,
    ) -> AppResult<Option<ActiveContextSelection>>;

    /// Stores `selection` unless one exists and returns whichever is stored.
    async fn initialize_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<ActiveContextSelection>;

    /// Replaces the selection stored for a session.
    async fn save_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<()>;

    /// Removes the selection when the session ends.
    async fn delete_selection(&self, session_id: ContextSessionId) -> AppResult<()>;
}

/// Event emitted after a session switched context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChanged {
    /// Session whose selection changed.
    pub session_id: ContextSessionId,
    /// Employee acting in the session.
    pub employee_id: EmployeeId,
    /// Context now current for the session.
    pub context: Context,
    /// When the switch was persisted.
    pub changed_at: DateTime<Utc>,
}

/// Fan-out for context-changed events to capability-consuming views.
#[async_trait]
pub trait ContextChangeNotifier: Send + Sync {
    /// Publishes one event; delivery is best-effort.
    async fn publish(&self, event: ContextChanged) -> AppResult<()>;
}

/// Authenticated actor of one HTTP session, as seen by context-aware services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSession {
    /// Key of the session's context selection.
    pub session_id: ContextSessionId,
    /// Signed-in actor.
    pub identity: UserIdentity,
    /// Token forwarded to the backend for this actor.
    pub access_token: BackendAccessToken,
}

impl ActorSession {
    /// Returns the employee acting in the session.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.identity.employee_id()
    }
}
