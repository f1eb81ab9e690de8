// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Override delegates.
//!
//! A delegate installed on a [`crate::ConfigClient`] becomes the sole authority
//! for every operation: neither the remote service nor the local store is
//! consulted while it is present.
//!
//! The capability set is `set`, `get` and `all`. Types implementing
//! [`ConfigDelegate`] satisfy it at compile time. Delegates assembled from
//! callbacks through [`DelegateBuilder`] are checked when they are built, which
//! is where a [`ValidationError`] comes from.
//!
//! Delegate calls run synchronously on the caller's thread. The client adds
//! no locking around them, so a delegate shared across threads must provide
//! its own synchronisation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;

/// Capability set required from an override delegate.
///
/// Returning `None` means "no result". The client maps it to a
/// type-appropriate empty value: a successful write for `set`, "not found"
/// for `get`, and an empty map for `all`.
pub trait ConfigDelegate: Send + Sync {
    /// Writes `value` under `key`. `None` asks the delegate to delete the key.
    fn set(&self, key: &str, value: Option<&str>) -> Option<bool>;

    /// Reads `key`. The caller's default is forwarded untouched.
    fn get(&self, key: &str, default: Option<&str>) -> Option<String>;

    fn all(&self) -> Option<HashMap<String, String>>;
}

type SetFn = Box<dyn Fn(&str, Option<&str>) -> Option<bool> + Send + Sync>;
type GetFn = Box<dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync>;
type AllFn = Box<dyn Fn() -> Option<HashMap<String, String>> + Send + Sync>;

/// Assembles a delegate out of individual callbacks.
#[derive(Default)]
pub struct DelegateBuilder {
    set: Option<SetFn>,
    get: Option<GetFn>,
    all: Option<AllFn>,
}

impl DelegateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_set<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<bool> + Send + Sync + 'static,
    {
        self.set = Some(Box::new(f));
        self
    }

    pub fn on_get<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        self.get = Some(Box::new(f));
        self
    }

    pub fn on_all<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<HashMap<String, String>> + Send + Sync + 'static,
    {
        self.all = Some(Box::new(f));
        self
    }

    /// Checks that every capability was supplied.
    pub fn build(self) -> Result<FnDelegate, ValidationError> {
        match (self.set, self.get, self.all) {
            (Some(set), Some(get), Some(all)) => Ok(FnDelegate { set, get, all }),
            (set, get, all) => {
                let missing = [
                    ("set", set.is_none()),
                    ("get", get.is_none()),
                    ("all", all.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                Err(ValidationError::MissingCapabilities(missing))
            }
        }
    }
}

impl fmt::Debug for DelegateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateBuilder")
            .field("set", &self.set.is_some())
            .field("get", &self.get.is_some())
            .field("all", &self.all.is_some())
            .finish()
    }
}

/// Delegate backed by closures, produced by [`DelegateBuilder::build`].
pub struct FnDelegate {
    set: SetFn,
    get: GetFn,
    all: AllFn,
}

impl ConfigDelegate for FnDelegate {
    fn set(&self, key: &str, value: Option<&str>) -> Option<bool> {
        (self.set)(key, value)
    }

    fn get(&self, key: &str, default: Option<&str>) -> Option<String> {
        (self.get)(key, default)
    }

    fn all(&self) -> Option<HashMap<String, String>> {
        (self.all)()
    }
}

impl fmt::Debug for FnDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnDelegate")
    }
}

/// Anything [`crate::ConfigClient::set_client`] accepts.
pub trait IntoDelegate {
    fn into_delegate(self) -> Result<Arc<dyn ConfigDelegate>, ValidationError>;
}

impl<D> IntoDelegate for D
where
    D: ConfigDelegate + 'static,
{
    fn into_delegate(self) -> Result<Arc<dyn ConfigDelegate>, ValidationError> {
        Ok(Arc::new(self))
    }
}

impl IntoDelegate for DelegateBuilder {
    fn into_delegate(self) -> Result<Arc<dyn ConfigDelegate>, ValidationError> {
        let delegate: Arc<dyn ConfigDelegate> = Arc::new(self.build()?);
        Ok(delegate)
    }
}
