//! `ProfileService`: store mutations followed by a best-effort reload.
//!
//! # Design
//! - Store calls are blocking file IO and run on the blocking pool.
//! - A mutation that reached the file is never reported as failed: the
//!   reload result travels separately in [`ReloadStatus`], so callers can
//!   tell "persisted and reloaded" from "persisted, reload failed".

use std::sync::Arc;

use opus_config::{ConfigResult, Profile, ProfileList, ProfileResource, ProfileStore};
use tracing::{info, warn};

use crate::error::{AdminError, AdminResult, ReloadError};
use crate::reload::ReloadNotifier;

/// What happened to the reload after a persisted mutation.
#[derive(Debug)]
pub enum ReloadStatus {
    /// The service accepted the reload request.
    Reloaded,
    /// No notifier is configured; nothing was sent.
    Skipped,
    /// The mutation persisted but the reload request failed.
    Failed(ReloadError),
}

impl ReloadStatus {
    /// Whether the running service may still be using stale configuration.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of a persisted mutation.
#[derive(Debug)]
#[must_use]
pub struct MutationOutcome<T> {
    /// Value produced by the store.
    pub value: T,
    /// Reload status following the mutation.
    pub reload: ReloadStatus,
}

/// Profile operations with reload coordination.
#[derive(Clone)]
pub struct ProfileService {
    store: ProfileStore,
    notifier: Option<Arc<dyn ReloadNotifier>>,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("store", &self.store)
            .field("reloads", &self.reloads())
            .finish()
    }
}

impl ProfileService {
    /// Service that never sends reload notifications.
    #[must_use]
    pub const fn new(store: ProfileStore) -> Self {
        Self {
            store,
            notifier: None,
        }
    }

    /// Service that notifies `notifier` after every persisted mutation.
    #[must_use]
    pub fn with_notifier(store: ProfileStore, notifier: Arc<dyn ReloadNotifier>) -> Self {
        Self {
            store,
            notifier: Some(notifier),
        }
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Whether mutations trigger reload notifications.
    #[must_use]
    pub const fn reloads(&self) -> bool {
        self.notifier.is_some()
    }

    /// All profiles, wrapped for view layers.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn list(&self) -> AdminResult<ProfileList> {
        let profiles = self.run_store("list", |store| store.list()).await?;
        Ok(ProfileList::from(profiles))
    }

    /// The profile stored under `name`.
    ///
    /// # Errors
    ///
    /// Propagates store failures, including `NotFound`.
    pub async fn get(&self, name: &str) -> AdminResult<Profile> {
        let name = name.to_string();
        self.run_store("get", move |store| store.get(&name)).await
    }

    /// Create a profile, then request a reload.
    ///
    /// # Errors
    ///
    /// Propagates store failures, including `DuplicateSection`. Reload
    /// failures are reported in the outcome.
    pub async fn create(&self, resource: ProfileResource) -> AdminResult<MutationOutcome<Profile>> {
        let value = self
            .run_store("create", move |store| store.create(&resource))
            .await?;
        let reload = self.reload("create", &value.name).await;
        Ok(MutationOutcome { value, reload })
    }

    /// Update a profile, then request a reload.
    ///
    /// # Errors
    ///
    /// Propagates store failures, including `NotFound`. Reload failures are
    /// reported in the outcome.
    pub async fn update(&self, resource: ProfileResource) -> AdminResult<MutationOutcome<Profile>> {
        let value = self
            .run_store("update", move |store| store.update(&resource))
            .await?;
        let reload = self.reload("update", &value.name).await;
        Ok(MutationOutcome { value, reload })
    }

    /// Delete a profile, then request a reload.
    ///
    /// # Errors
    ///
    /// Propagates store failures, including `NotFound`. Reload failures are
    /// reported in the outcome.
    pub async fn delete(&self, name: &str) -> AdminResult<MutationOutcome<()>> {
        let owned = name.to_string();
        self.run_store("delete", move |store| store.delete(&owned))
            .await?;
        let reload = self.reload("delete", name).await;
        Ok(MutationOutcome { value: (), reload })
    }

    async fn run_store<T, F>(&self, operation: &'static str, task: F) -> AdminResult<T>
    where
        T: Send + 'static,
        F: FnOnce(ProfileStore) -> ConfigResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || task(store))
            .await
            .map_err(|source| AdminError::Worker { operation, source })?;
        Ok(result?)
    }

    async fn reload(&self, operation: &'static str, profile: &str) -> ReloadStatus {
        let Some(notifier) = &self.notifier else {
            return ReloadStatus::Skipped;
        };
        match notifier.notify_reload().await {
            Ok(()) => {
                info!(operation, profile, "service reload requested");
                ReloadStatus::Reloaded
            }
            Err(err) => {
                warn!(
                    operation,
                    profile,
                    error = ?err,
                    "profile change persisted but service reload failed"
                );
                ReloadStatus::Failed(err)
            }
        }
    }
}
