// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tiered resolution of configuration operations.
//!
//! Every call picks exactly one authoritative tier, in this order:
//!
//! 1. the override delegate, when one is installed (its answer is final);
//! 2. the remote service, when enabled (any failure falls through to 3);
//! 3. the local store.
//!
//! Remote failures are never surfaced or logged here. Apart from latency
//! bounded by the remote deadline, an unreachable service behaves like a
//! disabled one.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::delegate::{ConfigDelegate, IntoDelegate};
use crate::error::ValidationError;
use crate::local::LocalStore;
use crate::remote::RemoteConfigClient;
use crate::settings::ClientSettings;

/// Remote tier wiring: the (possibly shared) client plus this instance's endpoint.
#[derive(Debug, Clone)]
struct RemoteTier {
    client: Arc<RemoteConfigClient>,
    endpoint: String,
}

/// Key/value configuration client with override, remote and local tiers.
pub struct ConfigClient {
    store: LocalStore,
    delegate: RwLock<Option<Arc<dyn ConfigDelegate>>>,
    remote: Option<RemoteTier>,
}

impl Default for ConfigClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigClient")
            .field("store", &self.store)
            .field("has_client", &self.has_client())
            .field("remote", &self.remote)
            .finish()
    }
}

impl ConfigClient {
    /// Creates a client backed by the local store only.
    pub fn new() -> Self {
        Self {
            store: LocalStore::new(),
            delegate: RwLock::new(None),
            remote: None,
        }
    }

    /// Creates a client that consults `remote` at `endpoint` before the local store.
    ///
    /// The same [`RemoteConfigClient`] may be handed to several configuration
    /// clients so they share one cached channel.
    pub fn with_remote(remote: Arc<RemoteConfigClient>, endpoint: impl Into<String>) -> Self {
        Self {
            remote: Some(RemoteTier {
                client: remote,
                endpoint: endpoint.into(),
            }),
            ..Self::new()
        }
    }

    /// Creates a client from explicit settings. The remote tier gets its own
    /// [`RemoteConfigClient`] when enabled.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        if settings.remote_enabled {
            Self::with_remote(
                Arc::new(RemoteConfigClient::new(settings.remote_timeout)),
                settings.remote_endpoint.clone(),
            )
        } else {
            Self::new()
        }
    }

    /// Installs an override delegate, replacing (and releasing) any previous one.
    ///
    /// On a [`ValidationError`] the previous delegate is left in place.
    pub fn set_client(&self, delegate: impl IntoDelegate) -> Result<(), ValidationError> {
        let delegate = delegate.into_delegate()?;
        let previous = self
            .delegate
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(delegate);
        // Dropped outside the lock in case the delegate's destructor is slow.
        drop(previous);
        Ok(())
    }

    pub fn has_client(&self) -> bool {
        self.delegate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Direct access to the local tier, bypassing resolution.
    pub fn local_store(&self) -> &LocalStore {
        &self.store
    }

    /// Writes `value` under `key` in the authoritative tier.
    pub fn set(&self, key: &str, value: &str) -> bool {
        if let Some(delegate) = self.delegate() {
            return delegate.set(key, Some(value)).unwrap_or(true);
        }

        if let Some(remote) = &self.remote {
            if remote.client.set(&remote.endpoint, key, value).is_ok() {
                return true;
            }
        }

        self.store.set(key, value);
        true
    }

    /// Reads `key`, returning `default` when the authoritative tier does not know it.
    ///
    /// An override receives `default` itself and its answer is returned as is.
    pub fn get(&self, key: &str, default: Option<&str>) -> Option<String> {
        if let Some(delegate) = self.delegate() {
            return delegate.get(key, default);
        }

        let fallback = || default.map(str::to_owned);

        if let Some(remote) = &self.remote {
            if let Ok(value) = remote.client.get(&remote.endpoint, key) {
                return value.or_else(fallback);
            }
        }

        self.store.get(key).or_else(fallback)
    }

    pub fn has(&self, key: &str) -> bool {
        if let Some(delegate) = self.delegate() {
            return delegate.get(key, None).is_some();
        }

        if let Some(remote) = &self.remote {
            if let Ok(value) = remote.client.get(&remote.endpoint, key) {
                return value.is_some();
            }
        }

        self.store.has(key)
    }

    /// Returns every entry of the authoritative tier. Tiers are never merged.
    pub fn all(&self) -> HashMap<String, String> {
        if let Some(delegate) = self.delegate() {
            return delegate.all().unwrap_or_default();
        }

        if let Some(remote) = &self.remote {
            if let Ok(items) = remote.client.all(&remote.endpoint) {
                return items;
            }
        }

        self.store.all()
    }

    /// Deletes `key`. Overrides have no delete capability, so they receive
    /// `set(key, None)` and their write outcome is returned.
    pub fn remove(&self, key: &str) -> bool {
        if let Some(delegate) = self.delegate() {
            return delegate.set(key, None).unwrap_or(true);
        }

        if let Some(remote) = &self.remote {
            if let Ok(removed) = remote.client.remove(&remote.endpoint, key) {
                return removed;
            }
        }

        self.store.remove(key)
    }

    // The handle is cloned out so the delegate runs without the slot lock held
    // and may itself call `set_client`.
    fn delegate(&self) -> Option<Arc<dyn ConfigDelegate>> {
        self.delegate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
