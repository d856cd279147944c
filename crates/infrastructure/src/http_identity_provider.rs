use async_trait::async_trait;
use presensi_application::IdentityProvider;
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId, UserIdentity};
use serde::Deserialize;

use crate::BackendClient;


/// Resolves portal identities through the backend's `/auth/me` endpoint.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: BackendClient,
}

impl HttpIdentityProvider {
    /// Creates a provider over the shared backend client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_identity(&self, access_token: &BackendAccessToken) -> AppResult<UserIdentity> {
        let url = self.client.endpoint("auth/me")?;
        let request = self.client.get(url, access_token);
        let body = self.client.send(request, "load backend profile").await?;

        parse_profile(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: i64,
    username: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    groups: Vec<GroupRow>,
    #[serde(default)]
    is_superuser: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupRow {
    Name(String),
    Named { name: String },
}

impl GroupRow {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Named { name } => name,
        }
    }
}

impl ProfileRow {
    fn display_name(&self) -> String {
        if let Some(display_name) = non_blank(self.display_name.as_deref()) {
            return display_name.to_owned();
        }

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");

        if full_name.is_empty() {
            self.username.clone()
        } else {
            full_name
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn parse_profile(body: &[u8]) -> AppResult<UserIdentity> {
    let row: ProfileRow = serde_json::from_slice(body).map_err(|error| {
        AppError::UpstreamUnavailable(format!("backend returned a malformed profile: {error}"))
    })?;

    if row.username.trim().is_empty() {
        return Err(AppError::Unauthorized(
            "backend profile carries no username".to_owned(),
        ));
    }

    let display_name = row.display_name();
    let email = non_blank(row.email.as_deref()).map(str::to_owned);

    Ok(UserIdentity::new(
        EmployeeId::new(row.id),
        row.username,
        display_name,
        email,
    )
    .with_groups(row.groups.into_iter().map(GroupRow::into_name).collect())
    .with_superuser(row.is_superuser))
}
