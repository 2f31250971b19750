//! HTTP client for the automation engine.
//!
//! This module provides the `EngineClient` used by both the gateway (to
//! forward requests) and the importer (to install and deploy flows).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use flowlight_core::FlowSet;

use crate::error::{EngineError, Result};
use crate::status::ConnectionStatus;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the TCP connect phase.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("flowlight-engine-client/", env!("CARGO_PKG_VERSION"));

/// Path of the engine's flow administration endpoint.
const FLOWS_PATH: &str = "flows";

/// Client for the automation engine's REST surface.
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    /// Create a new engine client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The engine base URL (e.g., "http://localhost:1880")
    /// * `timeout` - Timeout applied to every request
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EngineError::ClientBuild(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a new engine client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL of the engine, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an engine path.
    ///
    /// Exactly one slash separates the base URL and the path, whatever
    /// either side carries.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check whether the engine is reachable.
    ///
    /// Never fails: every outcome is folded into the returned status.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let url = self.url_for("");

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                ConnectionStatus::connected(&self.base_url)
            }
            Ok(response) => ConnectionStatus::error(
                &self.base_url,
                format!("Node-RED responded with status {}", response.status().as_u16()),
            ),
            Err(e) => match EngineError::from_transport(&url, &e) {
                EngineError::Unreachable { .. } => {
                    tracing::debug!(url = %url, error = %e, "Engine unreachable");
                    ConnectionStatus::disconnected(&self.base_url)
                }
                other => {
                    tracing::error!(url = %url, error = %other, "Error checking engine connection");
                    ConnectionStatus::error(
                        &self.base_url,
                        format!("Connection check failed: {other}"),
                    )
                }
            },
        }
    }

    /// Issue a single GET with its own timeout and return whatever status the
    /// engine answers with.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    pub async fn probe(&self, path: &str, timeout: Duration) -> Result<StatusCode> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| EngineError::from_transport(&url, &e))?;
        Ok(response.status())
    }

    // =========================================================================
    // Data forwarding
    // =========================================================================

    /// Get data from an engine endpoint.
    ///
    /// `query` is appended verbatim after a `?` when non-empty. A body that is
    /// not JSON is returned as `{"data": <text>}`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unreachable`] or [`EngineError::Http`] for
    /// upstream failures; both are logged before being returned.
    pub async fn get_data(&self, path: &str, query: Option<&str>) -> Result<Value> {
        let mut url = self.url_for(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        tracing::info!(url = %url, "Getting data from Node-RED");

        let result = self.client.get(&url).send().await;
        let (_, text) = Self::read_success(&url, result).await?;
        Ok(decode_read(text))
    }

    /// Send data to an engine endpoint via POST.
    ///
    /// A body that is not JSON is returned as
    /// `{"response": <text>, "status_code": <status>}`.
    ///
    /// # Errors
    ///
    /// Same as [`EngineClient::get_data`].
    pub async fn send_data(&self, path: &str, payload: &Value) -> Result<Value> {
        let url = self.url_for(path);
        tracing::info!(url = %url, "Sending data to Node-RED");
        tracing::debug!(payload = %payload, "Payload");

        let result = self.client.post(&url).json(payload).send().await;
        let (status, text) = Self::read_success(&url, result).await?;
        Ok(decode_write(status, text))
    }

    /// Update data at an engine endpoint via PUT.
    ///
    /// # Errors
    ///
    /// Same as [`EngineClient::get_data`].
    pub async fn put_data(&self, path: &str, payload: &Value) -> Result<Value> {
        let url = self.url_for(path);
        tracing::info!(url = %url, "Updating data in Node-RED");

        let result = self.client.put(&url).json(payload).send().await;
        let (status, text) = Self::read_success(&url, result).await?;
        Ok(decode_write(status, text))
    }

    /// Delete data at an engine endpoint via DELETE.
    ///
    /// # Errors
    ///
    /// Same as [`EngineClient::get_data`].
    pub async fn delete_data(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        tracing::info!(url = %url, "Deleting data from Node-RED");

        let result = self.client.delete(&url).send().await;
        let (status, text) = Self::read_success(&url, result).await?;
        Ok(decode_write(status, text))
    }

    // =========================================================================
    // Flow administration
    // =========================================================================

    /// Fetch the flows currently installed in the engine.
    ///
    /// # Errors
    ///
    /// Returns an upstream error, or [`EngineError::Decode`] if the listing is
    /// not a flow array.
    pub async fn fetch_flows(&self) -> Result<FlowSet> {
        let url = self.url_for(FLOWS_PATH);
        let result = self.client.get(&url).send().await;
        let (_, text) = Self::read_success(&url, result).await?;
        Ok(FlowSet::from_json(&text)?)
    }

    /// Install a flow definition.
    ///
    /// The engine expects the node array itself as the body, not an object
    /// wrapping it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Http`] with the response body unless the engine
    /// answers 200 or 204.
    pub async fn install_flows(&self, flows: &FlowSet) -> Result<()> {
        let url = self.url_for(FLOWS_PATH);
        let result = self.client.post(&url).json(flows).send().await;
        Self::expect_accepted(&url, result).await?;
        tracing::debug!(url = %url, nodes = flows.len(), "Installed flows");
        Ok(())
    }

    /// Trigger a full deploy of the installed flows.
    ///
    /// # Errors
    ///
    /// Same as [`EngineClient::install_flows`].
    pub async fn deploy_flows(&self) -> Result<()> {
        let url = self.url_for(FLOWS_PATH);
        let body = json!({ "type": "full" });
        let result = self.client.post(&url).json(&body).send().await;
        Self::expect_accepted(&url, result).await?;
        tracing::debug!(url = %url, "Deployed flows");
        Ok(())
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    /// Turn a send result into the status and body text of a success
    /// response, logging and classifying failures.
    async fn read_success(
        url: &str,
        result: reqwest::Result<reqwest::Response>,
    ) -> Result<(StatusCode, String)> {
        let response = result.map_err(|e| {
            let err = EngineError::from_transport(url, &e);
            tracing::error!(url = %url, error = %err, "Request error to Node-RED");
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let err = EngineError::from_transport(url, &e);
            tracing::error!(url = %url, error = %err, "Failed to read Node-RED response");
            err
        })?;

        if status.is_success() {
            Ok((status, text))
        } else {
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                body = %text,
                "HTTP error from Node-RED"
            );
            Err(EngineError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            })
        }
    }

    /// Accept only 200 and 204, as the flow administration API does.
    async fn expect_accepted(url: &str, result: reqwest::Result<reqwest::Response>) -> Result<()> {
        let response = result.map_err(|e| {
            let err = EngineError::from_transport(url, &e);
            tracing::error!(url = %url, error = %err, "Flow request failed");
            err
        })?;
        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(url = %url, status = status.as_u16(), body = %body, "Flow request rejected");
        Err(EngineError::Http {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode a read response: JSON if possible, else wrapped under `data`.
fn decode_read(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "data": text }))
}

/// Decode a write response: JSON if possible, else wrapped with its status.
fn decode_write(status: StatusCode, text: String) -> Value {
    serde_json::from_str(&text)
        .unwrap_or_else(|_| json!({ "response": text, "status_code": status.as_u16() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = EngineClient::new("http://localhost:1880/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1880");
    }

    #[test]
    fn url_normalisation() {
        let client = EngineClient::with_client(reqwest::Client::new(), "http://engine:1880//");
        assert_eq!(client.url_for("sensors"), "http://engine:1880/sensors");
        assert_eq!(client.url_for("/sensors"), "http://engine:1880/sensors");
        assert_eq!(client.url_for("//a/b"), "http://engine:1880/a/b");
        assert_eq!(client.url_for(""), "http://engine:1880/");
    }

    #[test]
    fn read_body_fallback() {
        assert_eq!(decode_read(r#"{"t": 21}"#.into()), json!({"t": 21}));
        assert_eq!(decode_read("plain text".into()), json!({"data": "plain text"}));
        assert_eq!(decode_read(String::new()), json!({"data": ""}));
    }

    #[test]
    fn write_body_fallback() {
        assert_eq!(
            decode_write(StatusCode::CREATED, "ok".into()),
            json!({"response": "ok", "status_code": 201})
        );
        assert_eq!(decode_write(StatusCode::OK, "[1,2]".into()), json!([1, 2]));
    }
}
