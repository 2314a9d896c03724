//! HTTP status/control source.
//!
//! Talks to the monitoring backend's JSON API:
//!
//! - `GET  {endpoint}/status` → [`StatusSnapshot`]
//! - `POST {endpoint}/start` with `{"url": "..."}` → [`ControlReply`]
//! - `POST {endpoint}/stop` → [`ControlReply`]
//!
//! Non-success responses carry `{"detail": ...}`, where the detail is either a
//! string or a list of validation errors; both become
//! [`MonitorError::Rejected`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ControlReply, ControlSource, StartRequest, StatusSnapshot, StatusSource};
use crate::error::MonitorError;

/// Status and control source backed by the monitoring backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }
}

#[async_trait]
impl StatusSource for HttpSource {
    async fn fetch_snapshot(&self) -> Result<StatusSnapshot, MonitorError> {
        let response = self.client.get(self.url("status")).send().await?;
        read_json(response).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[async_trait]
impl ControlSource for HttpSource {
    async fn start(&self, target: &str) -> Result<ControlReply, MonitorError> {
        debug!(target_url = target, "sending start request");
        let response = self
            .client
            .post(self.url("start"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&StartRequest { url: target })
            .send()
            .await?;
        read_json(response).await
    }

    async fn stop(&self) -> Result<ControlReply, MonitorError> {
        debug!("sending stop request");
        let response = self.client.post(self.url("stop")).send().await?;
        read_json(response).await
    }
}

/// Decode a success body, or turn an error body into [`MonitorError::Rejected`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, MonitorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MonitorError::Rejected {
            status: status.as_u16(),
            detail: rejection_detail(&body),
        });
    }

    response
        .json()
        .await
        .map_err(|e| MonitorError::Transport(format!("invalid response body: {}", e)))
}

/// Extract a readable message from an error body.
fn rejection_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return if body.trim().is_empty() {
            "No details".to_string()
        } else {
            body.trim().to_string()
        };
    };

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        // Validation failures: [{"loc": [...], "msg": "..."}]
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                "Validation error".to_string()
            } else {
                messages.join("; ")
            }
        }
        Some(other) => other.to_string(),
        None => "No details".to_string(),
    }
}

/// Builder for HttpSource.
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the backend base URL (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> HttpSource {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        HttpSource {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        }
    }
}
