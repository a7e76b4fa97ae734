use crate::config::RetryPolicy;
use crate::error::{RagError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// JSON-over-HTTPS client for a bearer-authenticated provider API, with a
/// per-request timeout and bounded retries.
pub struct ProviderClient {
    name: &'static str,
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl ProviderClient {
    pub fn new(name: &'static str, api_key: String, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Config(format!("Failed to build HTTP client for {}: {}", name, e)))?;

        Ok(Self {
            name,
            client,
            api_key,
            retry,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn post_json<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.try_post(url, body).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    log::warn!(
                        "{} (retry {}/{} in {:?})",
                        err,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_post<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::provider(self.name, Some(status.as_u16()), error_text));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RagError::provider(
                self.name,
                Some(status.as_u16()),
                format!("Malformed response: {}", e),
            )
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> RagError {
        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else {
            err.to_string()
        };
        RagError::provider(self.name, None, message)
    }
}
