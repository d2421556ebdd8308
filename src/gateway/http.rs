use crate::gateway::error::{GatewayError, GatewayResult};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Thin JSON-over-HTTP wrapper. Every call is a single attempt.
#[derive(Clone)]
pub struct GatewayHttpClient {
    client: Client,
    timeout: Duration,
}

impl GatewayHttpClient {
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client =
            Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| GatewayError::Transport {
                    message: format!("failed to initialize HTTP client: {}", e),
                })?;

        Ok(Self { client, timeout })
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let request = self.client.post(url).timeout(self.timeout).json(body);
        self.execute(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<T> {
        let url = Url::parse_with_params(url, query).map_err(|e| GatewayError::Transport {
            message: format!("invalid gateway url {}: {}", url, e),
        })?;
        let request = self.client.get(url).timeout(self.timeout);
        self.execute(request).await
    }

    // The gateway reports failures inside the JSON body, so the body is decoded
    // whatever the HTTP status is.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> GatewayResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                message: format!("gateway request failed: {}", e),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport {
                message: format!("failed to read gateway response: {}", e),
            })?;
        debug!(status = %status, body_len = text.len(), "gateway response received");

        serde_json::from_str::<T>(&text).map_err(|e| GatewayError::Decode {
            message: format!("invalid gateway JSON response (HTTP {}): {}", status, e),
        })
    }
}
