//! HTTP client with built-in retry logic and error handling.

use anyhow::{Context, Result};
use bytes::Bytes;
use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::retry::{RetryPolicy, is_retryable_error, status_error};

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        self.with_retry("GET JSON", || {
            let client = self.client.clone();
            let url = url.to_string();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .context("Failed to send request")?;

                let response = check_status(response).await?;

                response
                    .json::<T>()
                    .await
                    .context("Failed to parse JSON response")
            }
        })
        .await
    }

    /// Performs a POST request with a JSON body and deserializes the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {}...", url);

        let payload = Bytes::from(serde_json::to_vec(body).context("Failed to encode request")?);

        self.with_retry("POST JSON", || {
            let client = self.client.clone();
            let url = url.to_string();
            let payload = payload.clone();
            async move {
                let response = client
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload)
                    .send()
                    .await
                    .context("Failed to send request")?;

                let response = check_status(response).await?;

                response
                    .json::<T>()
                    .await
                    .context("Failed to parse JSON response")
            }
        })
        .await
    }

    /// Downloads a whole response body into memory.
    /// Redirects (e.g. to release asset storage) are followed by reqwest.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str, accept: &str) -> Result<Bytes> {
        debug!("Downloading {}...", url);

        let bytes = self
            .with_retry("Download", || {
                let client = self.client.clone();
                let url = url.to_string();
                let accept = accept.to_string();
                async move {
                    let response = client
                        .get(&url)
                        .header(ACCEPT, accept)
                        .send()
                        .await
                        .context("Failed to start download request")?;

                    let response = check_status(response).await?;

                    response
                        .bytes()
                        .await
                        .context("Failed to read download stream")
                }
            })
            .await?;

        debug!(
            "Downloaded {:.2} MB",
            bytes.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(bytes)
    }

    /// Uploads a binary body and deserializes the JSON response.
    #[tracing::instrument(skip(self, data))]
    pub async fn post_bytes<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        content_type: &str,
        data: Bytes,
    ) -> Result<T> {
        debug!("Uploading {} bytes to {}...", data.len(), url);

        self.with_retry("Upload", || {
            let client = self.client.clone();
            let url = url.to_string();
            let query: Vec<(String, String)> = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let content_type = content_type.to_string();
            let data = data.clone();
            async move {
                let response = client
                    .post(&url)
                    .query(&query)
                    .header(CONTENT_TYPE, content_type)
                    .header(CONTENT_LENGTH, data.len())
                    .body(data)
                    .send()
                    .await
                    .context("Failed to send upload request")?;

                let response = check_status(response).await?;

                response
                    .json::<T>()
                    .await
                    .context("Failed to parse JSON response")
            }
        })
        .await
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < attempts {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name,
                            attempt,
                            attempts,
                            e,
                            self.policy.delay.as_millis()
                        );
                        tokio::time::sleep(self.policy.delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, attempts)
        }))
    }
}

/// Passes successful responses through and turns the rest into classified errors,
/// keeping the response body for diagnosis.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}
