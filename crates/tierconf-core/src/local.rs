// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-process key/value tier.
//!
//! The local store is both the default storage when no other tier is enabled
//! and the fallback destination when the remote tier fails. Every operation
//! runs entirely under one mutex, so readers never observe a half-applied
//! write.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex-guarded mapping owned by a single [`crate::ConfigClient`].
#[derive(Debug, Default)]
pub struct LocalStore {
    values: Mutex<HashMap<String, String>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`.
    pub fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    /// Returns the stored value, or `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Deletes `key`, returning whether anything was removed.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Snapshot of every entry, taken under the lock.
    pub fn all(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Each mutation is a single map call, so a poisoned guard still holds a
    // consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
