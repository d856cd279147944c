//! Shared HTTP plumbing for the attendance backend.

use presensi_core::{AppError, AppResult, BackendAccessToken};
use reqwest::StatusCode;
use url::Url;


/// Base URL plus HTTP client used by every backend adapter.
#[derive(Clone)]
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// The base path always gains a trailing slash so relative endpoints join
    /// below it instead of replacing its last segment.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        Self {
            http_client,
            base_url,
        }
    }

    /// Returns the normalised base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| {
                AppError::Internal(format!("invalid backend endpoint '{path}': {error}"))
            })
    }

    pub(crate) fn get(
        &self,
        url: Url,
        access_token: &BackendAccessToken,
    ) -> reqwest::RequestBuilder {
        self.http_client.get(url).bearer_auth(access_token.expose())
    }

    pub(crate) fn post(
        &self,
        url: Url,
        access_token: &BackendAccessToken,
    ) -> reqwest::RequestBuilder {
        self.http_client.post(url).bearer_auth(access_token.expose())
    }

    /// Sends a request and returns the body of a successful response.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> AppResult<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|error| AppError::UpstreamUnavailable(format!("{action} failed: {error}")))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|error| {
            AppError::UpstreamUnavailable(format!("{action} returned an unreadable body: {error}"))
        })?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        Err(error_for_status(
            status,
            action,
            String::from_utf8_lossy(&body).as_ref(),
        ))
    }
}

/// Maps a non-success backend status to the application error taxonomy.
pub(crate) fn error_for_status(status: StatusCode, action: &str, body: &str) -> AppError {
    let body = body.trim();
    let detail = if body.is_empty() {
        format!("{action} failed with status {status}")
    } else {
        format!("{action} failed with status {status}: {body}")
    };

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(detail),
        StatusCode::FORBIDDEN => AppError::Forbidden(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::CONFLICT => AppError::Conflict(detail),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            AppError::UpstreamUnavailable(detail)
        }
        status if status.is_server_error() => AppError::UpstreamUnavailable(detail),
        _ => AppError::Validation(detail),
    }
}
