use async_trait::async_trait;
use presensi_application::{ApprovalForwardRequest, ApprovalGateway};
use presensi_core::{AppResult, BackendAccessToken};
use serde::Serialize;

use crate::BackendClient;

/// Forwards gated approval decisions to the backend.
#[derive(Clone)]
pub struct HttpApprovalGateway {
    client: BackendClient,
}

impl HttpApprovalGateway {
    /// Creates a gateway over the shared backend client.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct DecisionBody<'a> {
    decision: &'static str,
    scope: &'static str,
    approver_id: i64,
    acting_assignment_id: Option<i64>,
    note: Option<&'a str>,
}

#[async_trait]
impl ApprovalGateway for HttpApprovalGateway {
    async fn forward_decision(
        &self,
        access_token: &BackendAccessToken,
        request: ApprovalForwardRequest,
    ) -> AppResult<()> {
        let url = self.client.endpoint(
            format!(
                "approvals/{}/{}",
                request.operation.as_str(),
                request.record_id
            )
            .as_str(),
        )?;
        let body = DecisionBody {
            decision: request.decision.as_str(),
            scope: request.scope.as_str(),
            approver_id: request.approver_id.as_i64(),
            acting_assignment_id: request.acting_assignment_id.map(|id| id.as_i64()),
            note: request.note.as_deref(),
        };

        self.client
            .send(
                self.client.post(url, access_token).json(&body),
                "forward approval decision",
            )
            .await?;

        Ok(())
    }
}
