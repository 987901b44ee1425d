use crate::core::RateError;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = concat!("ratewatch/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by all rate providers.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Sends a request and returns the body of a successful response.
///
/// Non-2xx statuses are reported as `RateError::Status`; no retries.
pub async fn fetch_body(request: RequestBuilder) -> Result<String, RateError> {
    let response = request.send().await?;
    debug!(status = %response.status(), url = %response.url(), "Received response");

    if !response.status().is_success() {
        return Err(RateError::Status(response.status()));
    }

    Ok(response.text().await?)
}
