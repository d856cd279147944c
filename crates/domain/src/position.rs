use std::fmt::{Display, Formatter};

use presensi_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Backend identifier of a job position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(i64);

impl PositionId {
    /// Creates a position identifier from the backend's numeric key.
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

impl Display for PositionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Approval authority tier.
///
/// `0` grants nothing, `1` covers one division, `2` and above cover the
/// whole organization. Thresholds used for gating live in `ApprovalPolicy`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ApprovalLevel(u8);

impl ApprovalLevel {
    /// No approval rights.
    pub const NONE: Self = Self(0);
    /// Division-scope approval.
    pub const DIVISION: Self = Self(1);
    /// Organization-scope approval.
    pub const ORGANIZATION: Self = Self(2);

    /// Creates a level from its numeric tier.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the numeric tier.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Returns whether the level grants any approval rights.
    #[must_use]
    pub fn grants_approval(&self) -> bool {
        self.0 > 0
    }
}

impl Display for ApprovalLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Job role with inherent approval authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    id: PositionId,
    display_name: NonEmptyString,
    approval_level: ApprovalLevel,
    can_approve_org_wide: bool,
}

impl Position {
    /// Creates a position with a validated display name.
    pub fn new(
        id: PositionId,
        display_name: impl Into<String>,
        approval_level: ApprovalLevel,
        can_approve_org_wide: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            display_name: NonEmptyString::new(display_name)?,
            approval_level,
            can_approve_org_wide,
        })
    }

    /// Returns the position identifier.
    #[must_use]
    pub fn id(&self) -> PositionId {
        self.id
    }

    /// Returns the human-friendly name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the approval tier of the position.
    #[must_use]
    pub fn approval_level(&self) -> ApprovalLevel {
        self.approval_level
    }

    /// Returns whether the authority spans every division.
    #[must_use]
    pub fn can_approve_org_wide(&self) -> bool {
        self.can_approve_org_wide
    }
}

#[cfg(test)]
mod tests {
    use super::{ApprovalLevel, Position, PositionId};

    #[test]
    fn position_requires_display_name() {
        let position = Position::new(PositionId::new(1), " ", ApprovalLevel::DIVISION, false);
        assert!(position.is_err());
    }

    #[test]
    fn approval_levels_are_ordered() {
        assert!(ApprovalLevel::NONE < ApprovalLevel::DIVISION);
        assert!(ApprovalLevel::DIVISION < ApprovalLevel::ORGANIZATION);
        assert!(!ApprovalLevel::NONE.grants_approval());
        assert!(ApprovalLevel::new(3).grants_approval());
    }
}
