//! Landing surface selection at sign-in.
//!
//! Two independent signals feed the approval level used here: legacy group
//! names mapped to levels, and the combined level of the employee's active
//! position assignments. The larger one wins.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use presensi_core::{AppError, AppResult, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::ApprovalLevel;

/// Top-level area of the portal an actor lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingSurface {
    /// HR/admin console.
    Admin,
    /// Approval queue for supervisors.
    Supervisor,
    /// Plain employee self-service.
    Employee,
}

impl LandingSurface {
    /// Returns a stable transport value for this surface.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Supervisor => "supervisor",
            Self::Employee => "employee",
        }
    }

    /// Returns the frontend path the surface lives under.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Supervisor => "/supervisor",
            Self::Employee => "/employee",
        }
    }
}

/// Group-name rules carried over from the role-flag model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRoleLevels {
    admin_groups: BTreeSet<String>,
    role_levels: BTreeMap<String, ApprovalLevel>,
}

impl LegacyRoleLevels {
    /// Creates rules from admin group names and group-to-level mappings.
    ///
    /// Group names compare case-insensitively.
    #[must_use]
    pub fn new(
        admin_groups: impl IntoIterator<Item = String>,
        role_levels: impl IntoIterator<Item = (String, ApprovalLevel)>,
    ) -> Self {
        Self {
            admin_groups: admin_groups
                .into_iter()
                .map(|group| group.trim().to_lowercase())
                .collect(),
            role_levels: role_levels
                .into_iter()
                .map(|(group, level)| (group.trim().to_lowercase(), level))
                .collect(),
        }
    }

    /// Replaces the admin group names.
    #[must_use]
    pub fn with_admin_groups(self, admin_groups: impl IntoIterator<Item = String>) -> Self {
        Self::new(admin_groups, self.role_levels)
    }

    /// Returns whether the actor belongs to the admin surface.
    #[must_use]
    pub fn is_admin(&self, identity: &UserIdentity) -> bool {
        identity.is_superuser()
            || identity
                .groups()
                .iter()
                .any(|group| self.admin_groups.contains(&group.trim().to_lowercase()))
    }

    /// Returns the highest level any of the actor's groups maps to.
    #[must_use]
    pub fn role_level(&self, identity: &UserIdentity) -> ApprovalLevel {
        identity
            .groups()
            .iter()
            .filter_map(|group| self.role_levels.get(&group.trim().to_lowercase()))
            .copied()
            .max()
            .unwrap_or(ApprovalLevel::NONE)
    }
}

impl Default for LegacyRoleLevels {
    fn default() -> Self {
        Self::new(
            ["admin".to_owned()],
            [
                ("supervisor".to_owned(), ApprovalLevel::DIVISION),
                ("kepala_divisi".to_owned(), ApprovalLevel::DIVISION),
                ("ppk".to_owned(), ApprovalLevel::ORGANIZATION),
            ],
        )
    }
}

impl FromStr for LegacyRoleLevels {
    type Err = AppError;

    /// Parses `group=level` pairs separated by commas; admin groups are empty.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let role_levels = parse_role_levels(value)?;
        Ok(Self::new(Vec::new(), role_levels))
    }
}

fn parse_role_levels(value: &str) -> AppResult<Vec<(String, ApprovalLevel)>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (group, level) = entry.split_once('=').ok_or_else(|| {
                AppError::Validation(format!("role level entry '{entry}' must be 'group=level'"))
            })?;
            let group = group.trim();
            if group.is_empty() {
                return Err(AppError::Validation(format!(
                    "role level entry '{entry}' has an empty group name"
                )));
            }
            let level = level.trim().parse::<u8>().map_err(|error| {
                AppError::Validation(format!("invalid level in role entry '{entry}': {error}"))
            })?;

            Ok((group.to_owned(), ApprovalLevel::new(level)))
        })
        .collect()
}

/// Picks the landing surface from both approval-level signals.
///
/// `position_level` is `None` when position data could not be loaded; the
/// role-based signal alone then decides, which never grants more than the
/// actor's group memberships already do.
#[must_use]
pub fn resolve_landing_surface(
    identity: &UserIdentity,
    rules: &LegacyRoleLevels,
    position_level: Option<ApprovalLevel>,
) -> LandingSurface {
    if rules.is_admin(identity) {
        return LandingSurface::Admin;
    }

    let effective_level = rules
        .role_level(identity)
        .max(position_level.unwrap_or(ApprovalLevel::NONE));

    if effective_level >= ApprovalLevel::DIVISION {
        LandingSurface::Supervisor
    } else {
        LandingSurface::Employee
    }
}
