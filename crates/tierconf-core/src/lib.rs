// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Key/value configuration client with tiered resolution.
//!
//! [`ConfigClient`] exposes `set`, `get`, `has`, `all` and `remove`, and resolves
//! each call through an installed override delegate, a remote configuration
//! service, or an in-process [`LocalStore`], in that order of precedence.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod delegate;
pub mod error;
pub mod local;
pub mod remote;
pub mod settings;

pub use client::ConfigClient;
pub use delegate::{ConfigDelegate, DelegateBuilder, FnDelegate, IntoDelegate};
pub use error::{SettingsError, ValidationError};
pub use local::LocalStore;
pub use remote::{RemoteConfigClient, RemoteError, DEFAULT_TIMEOUT};
pub use settings::{ClientSettings, DEFAULT_ENDPOINT};
