//! Reload notification for the running telephony service.
//!
//! # Design
//! - A single POST per subsystem to the control endpoint with a
//!   `{"<subsystem>": "reload"}` body; only the status code is interpreted.
//! - The client carries a timeout so a stalled endpoint cannot hold a request
//!   handler indefinitely.
//! - `ReloadNotifier` is the seam the service depends on, so tests and
//!   alternative transports can stand in for HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::ReloadError;

/// Directive value sent for every subsystem.
pub const RELOAD_DIRECTIVE: &str = "reload";
const HEADER_REQUEST_ID: &str = "x-request-id";

/// Something that can ask the running service to re-read its configuration.
#[async_trait]
pub trait ReloadNotifier: Send + Sync {
    /// Request a reload.
    ///
    /// # Errors
    ///
    /// Returns a [`ReloadError`] when the request could not be delivered or
    /// was rejected.
    async fn notify_reload(&self) -> Result<(), ReloadError>;
}

/// HTTP notifier targeting the service-control endpoint.
#[derive(Debug, Clone)]
pub struct ReloadCoordinator {
    client: Client,
    endpoint: Url,
    subsystems: Vec<String>,
}

impl ReloadCoordinator {
    /// Build a coordinator with its own client and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Client`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: Url,
        subsystems: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, ReloadError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ReloadError::Client { source })?;
        Ok(Self::with_client(client, endpoint, subsystems))
    }

    /// Build a coordinator around an existing client.
    #[must_use]
    pub const fn with_client(client: Client, endpoint: Url, subsystems: Vec<String>) -> Self {
        Self {
            client,
            endpoint,
            subsystems,
        }
    }
}

/// Request body asking `subsystem` to reload.
#[must_use]
pub fn reload_body(subsystem: &str) -> Value {
    let mut body = Map::new();
    body.insert(
        subsystem.to_string(),
        Value::String(RELOAD_DIRECTIVE.to_string()),
    );
    Value::Object(body)
}

#[async_trait]
impl ReloadNotifier for ReloadCoordinator {
    async fn notify_reload(&self) -> Result<(), ReloadError> {
        let request_id = Uuid::new_v4().to_string();
        for subsystem in &self.subsystems {
            let response = self
                .client
                .post(self.endpoint.clone())
                .header(HEADER_REQUEST_ID, request_id.as_str())
                .json(&reload_body(subsystem))
                .send()
                .await
                .map_err(|source| ReloadError::Transport {
                    endpoint: self.endpoint.to_string(),
                    subsystem: subsystem.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ReloadError::Status {
                    endpoint: self.endpoint.to_string(),
                    subsystem: subsystem.clone(),
                    status,
                });
            }
            debug!(%subsystem, %request_id, status = status.as_u16(), "reload accepted");
        }
        Ok(())
    }
}
