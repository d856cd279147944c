use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId};
use presensi_domain::{
    ActiveContextSelection, AssignmentId, Context, DefaultContextPolicy, PositionAssignment,
    active_assignments, current_context, resolve_contexts, resolve_with_selected,
};
use tracing::{info, warn};

use crate::{
    ActorSession, ContextChangeNotifier, ContextChanged, ContextSelectionStore, ContextSessionId,
    PositionAssignmentRepository,
};


/// Resolved contexts for a session, distinguishing "no positions at all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAvailability {
    /// The employee holds no active assignment and has no approval capability.
    NoPositions,
    /// Ordered contexts; exactly one is current.
    Available(Vec<Context>),
}

impl ContextAvailability {
    fn from_contexts(contexts: Vec<Context>) -> Self {
        if contexts.is_empty() {
            Self::NoPositions
        } else {
            Self::Available(contexts)
        }
    }

    /// Returns the resolved contexts, empty for [`ContextAvailability::NoPositions`].
    #[must_use]
    pub fn contexts(&self) -> &[Context] {
        match self {
            Self::NoPositions => &[],
            Self::Available(contexts) => contexts.as_slice(),
        }
    }

    /// Returns the context the session currently acts in.
    #[must_use]
    pub fn current(&self) -> Option<&Context> {
        current_context(self.contexts())
    }
}

/// Application service owning context resolution and switching.
#[derive(Clone)]
pub struct ContextService {
    assignment_repository: Arc<dyn PositionAssignmentRepository>,
    selection_store: Arc<dyn ContextSelectionStore>,
    notifier: Arc<dyn ContextChangeNotifier>,
    default_policy: DefaultContextPolicy,
}

impl ContextService {
    /// Creates a context service from its ports.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn PositionAssignmentRepository>,
        selection_store: Arc<dyn ContextSelectionStore>,
        notifier: Arc<dyn ContextChangeNotifier>,
        default_policy: DefaultContextPolicy,
    ) -> Self {
        Self {
            assignment_repository,
            selection_store,
            notifier,
            default_policy,
        }
    }

    /// Returns the policy used for sessions without a selection.
    #[must_use]
    pub fn default_policy(&self) -> DefaultContextPolicy {
        self.default_policy
    }

    /// Resolves every selectable context for the session.
    pub async fn available_contexts(&self, session: &ActorSession) -> AppResult<ContextAvailability> {
        let assignments = self.load_assignments(session).await?;
        let today = today();
        let selection = self.selection_for(session, &assignments, today).await?;

        Ok(ContextAvailability::from_contexts(resolve_contexts(
            &assignments,
            &selection,
            today,
        )))
    }

    /// Returns the context the session currently acts in.
    ///
    /// `None` means the employee holds no active assignment.
    pub async fn current_context(&self, session: &ActorSession) -> AppResult<Option<Context>> {
        Ok(self.available_contexts(session).await?.current().cloned())
    }

    /// Returns the stored selection, initialising it on first use.
    pub async fn current_selection(
        &self,
        session: &ActorSession,
    ) -> AppResult<ActiveContextSelection> {
        let assignments = self.load_assignments(session).await?;
        self.selection_for(session, &assignments, today()).await
    }

    /// Switches the session to another context.
    ///
    /// `None` requests the combined context. Requests that match no active
    /// assignment fail with [`AppError::InvalidContext`] and leave the stored
    /// selection untouched.
    pub async fn switch_context(
        &self,
        session: &ActorSession,
        requested: Option<AssignmentId>,
    ) -> AppResult<Context> {
        let employee_id = session.employee_id();
        let assignments = self.load_assignments(session).await?;
        let contexts = resolve_with_selected(&assignments, employee_id, requested, today());

        if contexts.is_empty() {
            return Err(AppError::InvalidContext(format!(
                "employee '{employee_id}' has no active position assignment"
            )));
        }

        if let Some(requested_id) = requested
            && !contexts
                .iter()
                .any(|context| context.assignment_id() == Some(requested_id))
        {
            return Err(AppError::InvalidContext(format!(
                "assignment '{requested_id}' is not an active assignment of employee '{employee_id}'"
            )));
        }

        let current = current_context(&contexts).cloned().ok_or_else(|| {
            AppError::Internal(format!(
                "resolved contexts for employee '{employee_id}' have no current entry"
            ))
        })?;

        let changed_at = Utc::now();
        self.selection_store
            .save_selection(
                session.session_id,
                ActiveContextSelection::new(employee_id, requested, changed_at),
            )
            .await?;

        info!(
            employee_id = %employee_id,
            session_id = %session.session_id,
            assignment_id = ?requested.map(|id| id.as_i64()),
            approval_level = %current.approval_level(),
            "context switched"
        );

        if let Err(error) = self
            .notifier
            .publish(ContextChanged {
                session_id: session.session_id,
                employee_id,
                context: current.clone(),
                changed_at,
            })
            .await
        {
            warn!(session_id = %session.session_id, %error, "failed to publish context change");
        }

        Ok(current)
    }

    /// Drops the selection of a session that ended.
    pub async fn end_session(&self, session_id: ContextSessionId) -> AppResult<()> {
        self.selection_store.delete_selection(session_id).await
    }

    /// Lists an employee's assignments that are active and effective today.
    pub async fn list_active_assignments(
        &self,
        access_token: &BackendAccessToken,
        employee_id: EmployeeId,
    ) -> AppResult<Vec<PositionAssignment>> {
        let assignments = self
            .assignment_repository
            .list_assignments_for_employee(access_token, employee_id)
            .await?;

        Ok(active_assignments(&assignments, employee_id, today())
            .into_iter()
            .map(|(_, assignment)| assignment.clone())
            .collect())
    }

    pub(crate) async fn load_assignments(
        &self,
        session: &ActorSession,
    ) -> AppResult<Vec<PositionAssignment>> {
        self.assignment_repository
            .list_assignments_for_employee(&session.access_token, session.employee_id())
            .await
    }

    async fn selection_for(
        &self,
        session: &ActorSession,
        assignments: &[PositionAssignment],
        today: NaiveDate,
    ) -> AppResult<ActiveContextSelection> {
        let employee_id = session.employee_id();
        let initial = || {
            self.default_policy
                .initial_selection(employee_id, assignments, today, Utc::now())
        };

        match self.selection_store.find_selection(session.session_id).await? {
            Some(selection) if selection.employee_id() == employee_id => Ok(selection),
            Some(selection) => {
                warn!(
                    session_id = %session.session_id,
                    stored_employee_id = %selection.employee_id(),
                    employee_id = %employee_id,
                    "discarding context selection owned by another employee"
                );
                let selection = initial();
                self.selection_store
                    .save_selection(session.session_id, selection.clone())
                    .await?;
                Ok(selection)
            }
            None => {
                self.selection_store
                    .initialize_selection(session.session_id, initial())
                    .await
            }
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
