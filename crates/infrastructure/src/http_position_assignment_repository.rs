use async_trait::async_trait;
use chrono::NaiveDate;
use presensi_application::PositionAssignmentRepository;
use presensi_core::{AppError, AppResult, BackendAccessToken, EmployeeId};
use presensi_domain::{
    ApprovalLevel, AssignmentId, Position, PositionAssignment, PositionAssignmentInput,
    PositionId,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::BackendClient;

#[cfg(test)]
mod tests;

/// Reads position assignments from the backend's REST API.
#[derive(Clone)]
pub struct HttpPositionAssignmentRepository {
    client: BackendClient,
}

impl HttpPositionAssignmentRepository {
    /// Creates a repository over the shared backend client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

/// Upper bound on followed `next` links per listing.
const MAX_PAGES: usize = 20;

#[async_trait]
impl PositionAssignmentRepository for HttpPositionAssignmentRepository {
    async fn list_assignments_for_employee(
        &self,
        access_token: &BackendAccessToken,
        employee_id: EmployeeId,
    ) -> AppResult<Vec<PositionAssignment>> {
        let first_url = self.client.endpoint("positions/assignments")?;
        let mut request = self
            .client
            .get(first_url.clone(), access_token)
            .query(&[("employee_id", employee_id.as_i64())]);
        let mut current_url = first_url;
        let mut assignments = Vec::new();

        for _ in 0..MAX_PAGES {
            let body = self
                .client
                .send(request, "load position assignments")
                .await?;
            let page = parse_assignments(&body)?;
            assignments.extend(page.assignments);

            let Some(next) = page.next else {
                return Ok(assignments);
            };
            current_url = next_page_url(self.client.base_url(), &current_url, next.as_str())?;
            request = self.client.get(current_url.clone(), access_token);
        }

        Err(AppError::UpstreamUnavailable(format!(
            "assignment listing for employee '{employee_id}' exceeded {MAX_PAGES} pages"
        )))
    }
}

/// Resolves a `next` link; links leaving the backend origin are refused so
/// the bearer token is never sent elsewhere.
pub(crate) fn next_page_url(base_url: &Url, current_url: &Url, next: &str) -> AppResult<Url> {
    let next_url = current_url.join(next).map_err(|error| {
        AppError::UpstreamUnavailable(format!("backend returned an invalid next link: {error}"))
    })?;

    if next_url.origin() != base_url.origin() {
        return Err(AppError::UpstreamUnavailable(format!(
            "backend next link '{next_url}' points outside {}",
            base_url.origin().ascii_serialization()
        )));
    }

    Ok(next_url)
}

/// One decoded page of backend assignments.
#[derive(Debug)]
pub(crate) struct AssignmentPage {
    pub(crate) assignments: Vec<PositionAssignment>,
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssignmentPayload {
    List(Vec<Value>),
    Page {
        results: Vec<Value>,
        #[serde(default)]
        next: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    id: Option<i64>,
    employee_id: i64,
    position: PositionRow,
    #[serde(default)]
    is_primary: bool,
    #[serde(default)]
    is_active: bool,
    effective_from: NaiveDate,
    effective_until: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct PositionRow {
    id: i64,
    name: String,
    #[serde(default)]
    approval_level: u8,
    #[serde(default)]
    can_approve_org_wide: bool,
}

impl AssignmentRow {
    fn into_domain(self) -> AppResult<PositionAssignment> {
        let position = Position::new(
            PositionId::new(self.position.id),
            self.position.name,
            ApprovalLevel::new(self.position.approval_level),
            self.position.can_approve_org_wide,
        )?;

        PositionAssignment::new(PositionAssignmentInput {
            id: self.id.map(AssignmentId::new),
            employee_id: EmployeeId::new(self.employee_id),
            position,
            is_primary: self.is_primary,
            is_active: self.is_active,
            effective_from: self.effective_from,
            effective_until: self.effective_until,
        })
    }
}

/// Decodes one backend assignment page.
///
/// Each row is decoded on its own: rows that do not match the row shape or
/// violate domain invariants are dropped with a warning. A payload that is
/// not an assignment list at all is treated as an upstream failure.
pub(crate) fn parse_assignments(body: &[u8]) -> AppResult<AssignmentPage> {
    let payload: AssignmentPayload = serde_json::from_slice(body).map_err(|error| {
        AppError::UpstreamUnavailable(format!(
            "backend returned a malformed assignment payload: {error}"
        ))
    })?;
    let (rows, next) = match payload {
        AssignmentPayload::List(rows) => (rows, None),
        AssignmentPayload::Page { results, next } => (results, next),
    };

    let assignments = rows
        .into_iter()
        .filter_map(|row| {
            let row_id = row.get("id").and_then(Value::as_i64);
            let decoded = serde_json::from_value::<AssignmentRow>(row)
                .map_err(|error| {
                    AppError::Validation(format!("unreadable assignment row: {error}"))
                })
                .and_then(AssignmentRow::into_domain);

            match decoded {
                Ok(assignment) => Some(assignment),
                Err(error) => {
                    warn!(assignment_id = ?row_id, %error, "skipping invalid position assignment");
                    None
                }
            }
        })
        .collect();

    Ok(AssignmentPage {
        assignments,
        next: next.filter(|link| !link.trim().is_empty()),
    })
}
