//! Thin wrapper over `reqwest::Client` shared by every remote the job talks to.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::JobError;

/// User agent sent with every request.
pub const USER_AGENT: &str = "update-droptop-download-count";

/// HTTP client that turns non-success statuses into [`JobError::HttpStatus`].
///
/// No retries are attempted; a failed request fails the whole run.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the job's user agent.
    pub fn build() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends a prepared request and checks the response status.
    #[tracing::instrument(skip(self, request))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build().context("Failed to build request")?;
        let method = request.method().clone();
        let url = request.url().clone();

        debug!("{} {}...", method, url);

        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        check_status(response)
    }

    /// Sends a prepared request and deserializes the JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        read_json(response).await
    }
}

/// Passes successful responses through, converts the rest into [`JobError::HttpStatus`].
pub fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_text = status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string();

    Err(JobError::HttpStatus {
        url: response.url().to_string(),
        status: status.as_u16(),
        status_text,
    }
    .into())
}

/// Decodes a JSON response body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse JSON response from {}", url))
}
