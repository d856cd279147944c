use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use presensi_core::{AppError, EmployeeId};
use serde::{Deserialize, Serialize};

use crate::{ApprovalLevel, AssignmentId, PositionAssignment, PositionId};

mod resolver;


pub use resolver::{
    active_assignments, current_context, primary_assignment_id, resolve_contexts,
    resolve_with_selected,
};

/// Display name of the synthetic context spanning every active assignment.
pub const COMBINED_CONTEXT_NAME: &str = "Combined";

/// Resolved "acting-as" view offered to an employee.
///
/// A single context wraps one active assignment; the combined context has no
/// assignment and carries the union of every active assignment's authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    assignment_id: Option<AssignmentId>,
    position_id: Option<PositionId>,
    display_name: String,
    approval_level: ApprovalLevel,
    can_approve_org_wide: bool,
    is_primary: bool,
    is_current: bool,
}

impl Context {
    pub(crate) fn single(assignment_id: AssignmentId, assignment: &PositionAssignment) -> Self {
        let position = assignment.position();
        Self {
            assignment_id: Some(assignment_id),
            position_id: Some(position.id()),
            display_name: position.display_name().as_str().to_owned(),
            approval_level: position.approval_level(),
            can_approve_org_wide: position.can_approve_org_wide(),
            is_primary: assignment.is_primary(),
            is_current: false,
        }
    }

    pub(crate) fn combined(approval_level: ApprovalLevel, can_approve_org_wide: bool) -> Self {
        Self {
            assignment_id: None,
            position_id: None,
            display_name: COMBINED_CONTEXT_NAME.to_owned(),
            approval_level,
            can_approve_org_wide,
            is_primary: false,
            is_current: false,
        }
    }

    pub(crate) fn mark_current(&mut self, is_current: bool) {
        self.is_current = is_current;
    }

    /// Returns the wrapped assignment, `None` for the combined context.
    #[must_use]
    pub fn assignment_id(&self) -> Option<AssignmentId> {
        self.assignment_id
    }

    /// Returns the wrapped position, `None` for the combined context.
    #[must_use]
    pub fn position_id(&self) -> Option<PositionId> {
        self.position_id
    }

    /// Returns the selector label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the approval tier granted while acting in this context.
    #[must_use]
    pub fn approval_level(&self) -> ApprovalLevel {
        self.approval_level
    }

    /// Returns whether organization-wide approvals are granted.
    #[must_use]
    pub fn can_approve_org_wide(&self) -> bool {
        self.can_approve_org_wide
    }

    /// Returns whether the context wraps the primary assignment.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Returns whether the session currently acts in this context.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Returns whether this is the synthetic combined context.
    #[must_use]
    pub fn is_combined(&self) -> bool {
        self.assignment_id.is_none()
    }
}

/// Session-scoped pointer to the context an employee currently acts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContextSelection {
    employee_id: EmployeeId,
    selected_assignment_id: Option<AssignmentId>,
    updated_at: DateTime<Utc>,
}

impl ActiveContextSelection {
    /// Creates a selection; `None` selects the combined context.
    #[must_use]
    pub fn new(
        employee_id: EmployeeId,
        selected_assignment_id: Option<AssignmentId>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            employee_id,
            selected_assignment_id,
            updated_at,
        }
    }

    /// Creates a selection pointing at the combined context.
    #[must_use]
    pub fn combined(employee_id: EmployeeId, updated_at: DateTime<Utc>) -> Self {
        Self::new(employee_id, None, updated_at)
    }

    /// Returns the employee owning the selection.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the selected assignment, `None` for combined.
    #[must_use]
    pub fn selected_assignment_id(&self) -> Option<AssignmentId> {
        self.selected_assignment_id
    }

    /// Returns when the selection was last written.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Selection given to a session that has not chosen a context yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultContextPolicy {
    /// Start in the primary assignment when one is active, else combined.
    #[default]
    Primary,
    /// Always start in the combined context.
    Combined,
}

impl DefaultContextPolicy {
    /// Returns a stable configuration value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Combined => "combined",
        }
    }

    /// Builds the initial selection for an employee.
    #[must_use]
    pub fn initial_selection(
        &self,
        employee_id: EmployeeId,
        assignments: &[PositionAssignment],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> ActiveContextSelection {
        let selected = match self {
            Self::Primary => primary_assignment_id(assignments, employee_id, today),
            Self::Combined => None,
        };

        ActiveContextSelection::new(employee_id, selected, now)
    }
}

impl FromStr for DefaultContextPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "primary" => Ok(Self::Primary),
            "combined" => Ok(Self::Combined),
            _ => Err(AppError::Validation(format!(
                "unknown default context policy '{value}'"
            ))),
        }
    }
}
