//! Resolved administration settings.
//!
//! # Design
//! - Plain data resolved by the front end (flags, environment, defaults).
//! - `build_service` is the only place the store and coordinator are wired.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use opus_config::ProfileStore;
use reqwest::Url;

use crate::error::ReloadError;
use crate::reload::ReloadCoordinator;
use crate::service::ProfileService;

/// Control endpoint used when no override is configured.
pub const DEFAULT_RELOAD_URL: &str = "http://localhost:8668/services";
/// Subsystem reloaded after every mutation by default.
pub const DEFAULT_SUBSYSTEM: &str = "asterisk";
/// Reload request timeout used when no override is configured.
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Reload notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSettings {
    /// Control endpoint receiving reload requests.
    pub endpoint: Url,
    /// Subsystems to reload, in request order.
    pub subsystems: Vec<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ReloadSettings {
    /// Settings for `endpoint` with the default subsystem and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Endpoint`] when `endpoint` is not a valid URL.
    pub fn parse(endpoint: &str) -> Result<Self, ReloadError> {
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|source| ReloadError::Endpoint {
                value: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            endpoint,
            subsystems: vec![DEFAULT_SUBSYSTEM.to_string()],
            timeout: DEFAULT_RELOAD_TIMEOUT,
        })
    }
}

/// Settings needed to build a [`ProfileService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSettings {
    /// Path of the profile store file.
    pub store_path: PathBuf,
    /// Reload notification; `None` disables reloads.
    pub reload: Option<ReloadSettings>,
}

impl AdminSettings {
    /// Wire the store and, when configured, the HTTP reload coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Client`] if the HTTP client cannot be built.
    pub fn build_service(&self) -> Result<ProfileService, ReloadError> {
        let store = ProfileStore::new(self.store_path.clone());
        let Some(reload) = &self.reload else {
            return Ok(ProfileService::new(store));
        };
        let coordinator = ReloadCoordinator::new(
            reload.endpoint.clone(),
            reload.subsystems.clone(),
            reload.timeout,
        )?;
        Ok(ProfileService::with_notifier(store, Arc::new(coordinator)))
    }
}
