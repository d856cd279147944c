use std::str::FromStr;

use presensi_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{ApprovalLevel, Context, current_context};

/// Reach of an approval action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalScope {
    /// Records belonging to the approver's own division.
    Division,
    /// Records anywhere in the organization.
    Organization,
}

impl ApprovalScope {
    /// Returns a stable transport value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::Organization => "organization",
        }
    }

    /// Returns all known scopes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ApprovalScope] = &[ApprovalScope::Division, ApprovalScope::Organization];

        ALL
    }
}

impl FromStr for ApprovalScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "division" => Ok(Self::Division),
            "organization" => Ok(Self::Organization),
            _ => Err(AppError::Validation(format!(
                "unknown approval scope '{value}'"
            ))),
        }
    }
}

/// Backend workflows that require a supervisor decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOperation {
    /// Corrections to recorded check-in/check-out times.
    AttendanceCorrection,
    /// Overtime submissions.
    Overtime,
    /// Leave requests.
    Leave,
}

impl ApprovalOperation {
    /// Returns a stable transport value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttendanceCorrection => "attendance_correction",
            Self::Overtime => "overtime",
            Self::Leave => "leave",
        }
    }

    /// Returns all known operations.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ApprovalOperation] = &[
            ApprovalOperation::AttendanceCorrection,
            ApprovalOperation::Overtime,
            ApprovalOperation::Leave,
        ];

        ALL
    }
}

impl FromStr for ApprovalOperation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "attendance_correction" => Ok(Self::AttendanceCorrection),
            "overtime" => Ok(Self::Overtime),
            "leave" => Ok(Self::Leave),
            _ => Err(AppError::Validation(format!(
                "unknown approval operation '{value}'"
            ))),
        }
    }
}

/// Outcome an approver records on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Accept the request.
    Approve,
    /// Decline the request.
    Reject,
}

impl ApprovalDecision {
    /// Returns a stable transport value for this decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for ApprovalDecision {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(AppError::Validation(format!(
                "unknown approval decision '{value}'"
            ))),
        }
    }
}

/// Minimum authority an action demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalRequirement {
    /// Lowest approval level allowed to act.
    pub min_level: ApprovalLevel,
    /// Whether the action needs organization-wide authority.
    pub requires_org_wide: bool,
}

/// Level thresholds applied to approval scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    division_min_level: ApprovalLevel,
    organization_min_level: ApprovalLevel,
}

impl ApprovalPolicy {
    /// Creates a policy; the organization threshold may not undercut the division one.
    pub fn new(
        division_min_level: ApprovalLevel,
        organization_min_level: ApprovalLevel,
    ) -> AppResult<Self> {
        if !division_min_level.grants_approval() {
            return Err(AppError::Validation(
                "division approval threshold must be at least 1".to_owned(),
            ));
        }

        if organization_min_level < division_min_level {
            return Err(AppError::Validation(format!(
                "organization approval threshold {organization_min_level} is below division threshold {division_min_level}"
            )));
        }

        Ok(Self {
            division_min_level,
            organization_min_level,
        })
    }

    /// Returns the requirement for acting in a scope; every operation shares it.
    #[must_use]
    pub fn requirement(&self, scope: ApprovalScope) -> ApprovalRequirement {
        match scope {
            ApprovalScope::Division => ApprovalRequirement {
                min_level: self.division_min_level,
                requires_org_wide: false,
            },
            ApprovalScope::Organization => ApprovalRequirement {
                min_level: self.organization_min_level,
                requires_org_wide: true,
            },
        }
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            division_min_level: ApprovalLevel::DIVISION,
            organization_min_level: ApprovalLevel::ORGANIZATION,
        }
    }
}

/// Approval authority available to an actor right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet {
    approval_level: ApprovalLevel,
    can_approve_org_wide: bool,
}

impl CapabilitySet {
    /// Capability of an actor with no approval rights.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Capability granted by one context.
    #[must_use]
    pub fn from_context(context: &Context) -> Self {
        Self {
            approval_level: context.approval_level(),
            can_approve_org_wide: context.can_approve_org_wide(),
        }
    }

    /// Capability of the current context in a resolved list, none when empty.
    #[must_use]
    pub fn from_contexts(contexts: &[Context]) -> Self {
        current_context(contexts)
            .map(Self::from_context)
            .unwrap_or_else(Self::none)
    }

    /// Returns the granted approval tier.
    #[must_use]
    pub fn approval_level(&self) -> ApprovalLevel {
        self.approval_level
    }

    /// Returns whether organization-wide approvals are granted.
    #[must_use]
    pub fn can_approve_org_wide(&self) -> bool {
        self.can_approve_org_wide
    }

    /// Returns whether the capability satisfies a requirement.
    #[must_use]
    pub fn permits(&self, requirement: &ApprovalRequirement) -> bool {
        self.approval_level.grants_approval()
            && self.approval_level >= requirement.min_level
            && (!requirement.requires_org_wide || self.can_approve_org_wide)
    }
}
