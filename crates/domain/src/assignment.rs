use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use presensi_core::{AppError, AppResult, EmployeeId};
use serde::{Deserialize, Serialize};

use crate::Position;

/// Backend identifier of an employee-to-position assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(i64);

impl AssignmentId {
    /// Creates an assignment identifier from the backend's numeric key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AssignmentId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Binding of one employee to one position over a validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    id: Option<AssignmentId>,
    employee_id: EmployeeId,
    position: Position,
    is_primary: bool,
    is_active: bool,
    effective_from: NaiveDate,
    effective_until: Option<NaiveDate>,
}

/// Input for building a [`PositionAssignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAssignmentInput {
    /// Backend identifier; `None` for a synthetic entry.
    pub id: Option<AssignmentId>,
    /// Assigned employee.
    pub employee_id: EmployeeId,
    /// Assigned position.
    pub position: Position,
    /// Whether this is the employee's primary position.
    pub is_primary: bool,
    /// Whether HR has the assignment enabled.
    pub is_active: bool,
    /// First day the assignment applies.
    pub effective_from: NaiveDate,
    /// Last day the assignment applies, open-ended when absent.
    pub effective_until: Option<NaiveDate>,
}

impl PositionAssignment {
    /// Creates an assignment, rejecting inverted validity windows.
    pub fn new(input: PositionAssignmentInput) -> AppResult<Self> {
        if let Some(until) = input.effective_until
            && until < input.effective_from
        {
            return Err(AppError::Validation(format!(
                "assignment effective_until '{until}' precedes effective_from '{}'",
                input.effective_from
            )));
        }

        Ok(Self {
            id: input.id,
            employee_id: input.employee_id,
            position: input.position,
            is_primary: input.is_primary,
            is_active: input.is_active,
            effective_from: input.effective_from,
            effective_until: input.effective_until,
        })
    }

    /// Returns the assignment identifier, if the backend issued one.
    #[must_use]
    pub fn id(&self) -> Option<AssignmentId> {
        self.id
    }

    /// Returns the assigned employee.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the assigned position.
    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns whether this is the employee's primary position.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Returns the HR activation flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the first effective day.
    #[must_use]
    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    /// Returns the last effective day, if bounded.
    #[must_use]
    pub fn effective_until(&self) -> Option<NaiveDate> {
        self.effective_until
    }

    /// Returns whether the assignment is enabled and its window covers `today`.
    #[must_use]
    pub fn is_effective_on(&self, today: NaiveDate) -> bool {
        self.is_active
            && self.effective_from <= today
            && self.effective_until.is_none_or(|until| until >= today)
    }
}
