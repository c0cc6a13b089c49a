//! Error types for profile administration and reload notification.

use opus_config::ConfigError;
use reqwest::StatusCode;
use thiserror::Error;
use tokio::task::JoinError;

/// Failure of a post-mutation reload notification.
///
/// Never fails the mutation that triggered it; it is reported through
/// [`crate::ReloadStatus::Failed`].
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid reload endpoint")]
    Endpoint {
        /// Endpoint text supplied by configuration.
        value: String,
        /// URL parse failure.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build reload client")]
    Client {
        /// Client builder failure.
        source: reqwest::Error,
    },
    /// The request could not be delivered (refused, timed out, reset).
    #[error("reload request failed")]
    Transport {
        /// Endpoint the request targeted.
        endpoint: String,
        /// Subsystem whose reload was requested.
        subsystem: String,
        /// Transport failure.
        source: reqwest::Error,
    },
    /// The control endpoint answered with a non-success status.
    #[error("reload request rejected")]
    Status {
        /// Endpoint the request targeted.
        endpoint: String,
        /// Subsystem whose reload was requested.
        subsystem: String,
        /// Status returned by the endpoint.
        status: StatusCode,
    },
}

impl ReloadError {
    /// Whether the request timed out before a response arrived.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Failure of a profile operation. Reload failures are not represented here.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The store rejected or failed the operation.
    #[error("profile store operation failed")]
    Config(#[from] ConfigError),
    /// The blocking store task panicked or was cancelled.
    #[error("profile store task failed")]
    Worker {
        /// Operation identifier.
        operation: &'static str,
        /// Join failure.
        source: JoinError,
    },
}

/// Convenience alias for profile service results.
pub type AdminResult<T> = Result<T, AdminError>;
