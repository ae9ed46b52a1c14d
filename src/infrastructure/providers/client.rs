//! Shared HTTP plumbing for provider adapters.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;

use crate::domain::errors::ProviderError;

const USER_AGENT: &str = concat!("hydragen/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client construction failure.
#[derive(Debug, Error)]
#[error("failed to create HTTP client: {0}")]
pub struct ClientBuildError(String);

/// Builds the HTTP client used by providers.
///
/// # Errors
/// Returns error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, ClientBuildError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ClientBuildError(e.to_string()))
}

/// Fully read provider response.
#[derive(Debug)]
pub(super) struct FetchedBody {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

/// Issues a GET and reads the whole body. The response is consumed, so the
/// connection is released on every path.
pub(super) async fn get_body(client: &Client, url: &str) -> Result<FetchedBody, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| map_transport_error(&e))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(&e))?;

    Ok(FetchedBody {
        status,
        content_type,
        body,
    })
}

/// Maps a transport error, keeping timeouts distinct.
pub(super) fn map_transport_error(err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err.to_string())
    }
}
