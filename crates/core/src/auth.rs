use serde::{Deserialize, Serialize};

use crate::EmployeeId;

/// Actor information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    employee_id: EmployeeId,
    username: String,
    display_name: String,
    email: Option<String>,
    groups: Vec<String>,
    is_superuser: bool,
}

impl UserIdentity {
    /// Creates an identity from the backend's profile data.
    #[must_use]
    pub fn new(
        employee_id: EmployeeId,
        username: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            employee_id,
            username: username.into(),
            display_name: display_name.into(),
            email,
            groups: Vec::new(),
            is_superuser: false,
        }
    }

    /// Attaches group memberships reported by the backend.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    /// Marks the actor as a backend superuser.
    #[must_use]
    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    /// Returns the employee the actor signs in as.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the backend login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the backend returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the group names the actor belongs to.
    #[must_use]
    pub fn groups(&self) -> &[String] {
        self.groups.as_slice()
    }

    /// Returns whether the backend flags the actor as superuser.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

/// Bearer token forwarded to the attendance backend on behalf of the actor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendAccessToken(String);

impl BackendAccessToken {
    /// Wraps a raw bearer token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for BackendAccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("BackendAccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendAccessToken, UserIdentity};
    use crate::EmployeeId;

    #[test]
    fn access_token_debug_is_redacted() {
        let token = BackendAccessToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[test]
    fn identity_builder_keeps_groups() {
        let identity = UserIdentity::new(EmployeeId::new(7), "rina", "Rina", None)
            .with_groups(vec!["supervisor".to_owned()])
            .with_superuser(true);

        assert_eq!(identity.groups(), ["supervisor".to_owned()]);
        assert!(identity.is_superuser());
    }
}
