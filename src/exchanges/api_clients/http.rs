use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::shared::errors::{DexError, DexResult};
use crate::shared::utils::RetryPolicy;

const USER_AGENT: &str = "dexcodec/0.1";

/// `{success, data, error|message}` body returned by the quote and pool APIs
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Payload of a successful envelope; `what` names the request in errors
    pub fn into_data(self, what: &str) -> DexResult<T> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(DexError::Network(format!("{} request failed: {}", what, reason)));
        }
        self.data
            .ok_or_else(|| DexError::Network(format!("{} response has no data", what)))
    }
}

/// JSON client with bounded linear-backoff retries, one per adapter
#[derive(Debug, Clone)]
pub struct QuoteHttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl QuoteHttpClient {
    pub fn new(timeout: Duration, retry_count: u32) -> DexResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DexError::Network(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            retry: RetryPolicy::new(retry_count, Duration::from_secs(1)),
        })
    }

    pub fn with_backoff(mut self, backoff_unit: Duration) -> Self {
        self.retry = RetryPolicy::new(self.retry.attempts(), backoff_unit);
        self
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> DexResult<T> {
        let response = self
            .send_with_retry(url, || self.client.get(url).query(query))
            .await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> DexResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send_with_retry(url, || self.client.post(url).json(body))
            .await?;
        decode(response).await
    }

    /// Retries transport errors and 5xx; anything below 500 ends the loop
    async fn send_with_retry<F>(&self, url: &str, build: F) -> DexResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = String::new();
        let attempts = self.retry.attempts();

        for attempt in 1..=attempts {
            match build().send().await {
                Ok(response) if response.status().as_u16() < 500 => {
                    let status = response.status();
                    if status.is_client_error() {
                        return Err(DexError::Network(format!(
                            "request failed with status {}",
                            status.as_u16()
                        )));
                    }
                    debug!(url, attempt, status = status.as_u16(), "http request ok");
                    return Ok(response);
                }
                Ok(response) => {
                    last_error = format!("status {}", response.status().as_u16());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            warn!(url, attempt, max = attempts, error = %last_error, "http request failed");

            if attempt < attempts {
                tokio::time::sleep(self.retry.delay(attempt)).await;
            }
        }

        Err(DexError::Network(format!(
            "request failed after {} retries: {}",
            attempts, last_error
        )))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> DexResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DexError::Network(format!("failed to read response: {}", e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}
