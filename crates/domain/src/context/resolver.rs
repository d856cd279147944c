use std::collections::BTreeSet;

use chrono::NaiveDate;
use presensi_core::EmployeeId;

use super::{ActiveContextSelection, Context};
use crate::{ApprovalLevel, AssignmentId, PositionAssignment};

/// Resolves the selectable contexts for the selection's employee.
///
/// Returns an empty list when the employee has no active assignment; callers
/// must treat that as "no approval capability", not as a level-0 context.
#[must_use]
pub fn resolve_contexts(
    assignments: &[PositionAssignment],
    selection: &ActiveContextSelection,
    today: NaiveDate,
) -> Vec<Context> {
    resolve_with_selected(
        assignments,
        selection.employee_id(),
        selection.selected_assignment_id(),
        today,
    )
}

/// Resolves contexts with an explicit selected assignment.
///
/// Single contexts are ordered primary first, then by ascending approval
/// level with ties broken by assignment id; the combined context is last.
/// A selected id that matches no single context marks combined as current.
#[must_use]
pub fn resolve_with_selected(
    assignments: &[PositionAssignment],
    employee_id: EmployeeId,
    selected: Option<AssignmentId>,
    today: NaiveDate,
) -> Vec<Context> {
    let mut active = active_assignments(assignments, employee_id, today);
    if active.is_empty() {
        return Vec::new();
    }

    let leading_primary = leading_primary_id(&active);
    active.sort_by(|(left_id, left), (right_id, right)| {
        let left_leads = Some(*left_id) == leading_primary;
        let right_leads = Some(*right_id) == leading_primary;
        right_leads
            .cmp(&left_leads)
            .then_with(|| {
                left.position()
                    .approval_level()
                    .cmp(&right.position().approval_level())
            })
            .then_with(|| left_id.cmp(right_id))
    });

    let combined_level = active
        .iter()
        .map(|(_, assignment)| assignment.position().approval_level())
        .max()
        .unwrap_or(ApprovalLevel::NONE);
    let combined_org_wide = active
        .iter()
        .any(|(_, assignment)| assignment.position().can_approve_org_wide());

    let mut contexts: Vec<Context> = active
        .iter()
        .map(|(assignment_id, assignment)| Context::single(*assignment_id, assignment))
        .collect();
    contexts.push(Context::combined(combined_level, combined_org_wide));

    let current_index = selected
        .and_then(|selected_id| {
            contexts
                .iter()
                .position(|context| context.assignment_id() == Some(selected_id))
        })
        .unwrap_or(contexts.len() - 1);

    for (index, context) in contexts.iter_mut().enumerate() {
        context.mark_current(index == current_index);
    }

    contexts
}

/// Returns the assignments that can back a context today, keyed by id.
///
/// Drops inactive, not-yet-effective, expired, id-less and foreign-employee
/// entries; a repeated id keeps its first occurrence.
#[must_use]
pub fn active_assignments(
    assignments: &[PositionAssignment],
    employee_id: EmployeeId,
    today: NaiveDate,
) -> Vec<(AssignmentId, &PositionAssignment)> {
    let mut seen = BTreeSet::new();

    assignments
        .iter()
        .filter(|assignment| {
            assignment.employee_id() == employee_id && assignment.is_effective_on(today)
        })
        .filter_map(|assignment| assignment.id().map(|id| (id, assignment)))
        .filter(|(id, _)| seen.insert(*id))
        .collect()
}

/// Returns the employee's primary assignment among today's active ones.
///
/// When the backend reports several primaries, the lowest id wins.
#[must_use]
pub fn primary_assignment_id(
    assignments: &[PositionAssignment],
    employee_id: EmployeeId,
    today: NaiveDate,
) -> Option<AssignmentId> {
    leading_primary_id(&active_assignments(assignments, employee_id, today))
}

/// Returns the context marked current, if the list is non-empty.
#[must_use]
pub fn current_context(contexts: &[Context]) -> Option<&Context> {
    contexts.iter().find(|context| context.is_current())
}

fn leading_primary_id(active: &[(AssignmentId, &PositionAssignment)]) -> Option<AssignmentId> {
    active
        .iter()
        .filter(|(_, assignment)| assignment.is_primary())
        .map(|(id, _)| *id)
        .min()
}
