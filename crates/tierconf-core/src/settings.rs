// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Environment-driven settings for the configuration client.
//!
//! The resolver never reads the environment itself. Hosts build a
//! [`ClientSettings`] here (or by hand) and pass it to
//! [`crate::ConfigClient::from_settings`].

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::SettingsError;
use crate::remote::DEFAULT_TIMEOUT;

/// Environment variable toggling the remote tier.
pub const ENV_REMOTE_ENABLED: &str = "TIERCONF_REMOTE_ENABLED";
/// Environment variable holding the per-call remote deadline in milliseconds.
pub const ENV_REMOTE_TIMEOUT_MS: &str = "TIERCONF_REMOTE_TIMEOUT_MS";
/// Environment variable holding the remote service endpoint.
pub const ENV_REMOTE_ENDPOINT: &str = "TIERCONF_REMOTE_ENDPOINT";

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:9100";

/// Plain configuration values consumed by [`crate::ConfigClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Whether the remote tier is consulted. Defaults to `false`.
    pub remote_enabled: bool,
    /// Deadline applied to every remote call.
    pub remote_timeout: Duration,
    /// Remote service address, `host:port` or a full URL.
    pub remote_endpoint: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            remote_enabled: false,
            remote_timeout: DEFAULT_TIMEOUT,
            remote_endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl ClientSettings {
    /// Builds settings from the current process environment.
    pub fn from_os_env() -> Self {
        Self::from_env_iter(env::vars())
    }

    /// Builds settings from an iterator of key/value pairs (typically for tests).
    pub fn from_env_iter<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let remote_enabled = parse_bool(map.get(ENV_REMOTE_ENABLED).map(String::as_str), false);
        let remote_timeout = parse_timeout_ms(map.get(ENV_REMOTE_TIMEOUT_MS).map(String::as_str));
        let remote_endpoint = map
            .get(ENV_REMOTE_ENDPOINT)
            .and_then(|value| sanitize_non_empty(value))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self {
            remote_enabled,
            remote_timeout,
            remote_endpoint,
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.remote_enabled && self.remote_endpoint.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "remote endpoint cannot be empty when the remote tier is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses a millisecond deadline, floor-clamping unusable values to the default.
fn parse_timeout_ms(value: Option<&str>) -> Duration {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return DEFAULT_TIMEOUT;
    };
    match raw.parse::<i64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms.unsigned_abs()),
        Ok(ms) => {
            warn!(
                "remote timeout {}ms is not positive; using {:?} instead",
                ms, DEFAULT_TIMEOUT
            );
            DEFAULT_TIMEOUT
        }
        Err(_) => {
            warn!(
                "remote timeout {:?} is not an integer; using {:?} instead",
                raw, DEFAULT_TIMEOUT
            );
            DEFAULT_TIMEOUT
        }
    }
}

/// Helper trimming whitespace and discarding empty values.
fn sanitize_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses boolean values from strings, falling back to the provided default.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|s| s.trim().to_ascii_lowercase()) {
        Some(ref v) if ["1", "true", "t", "yes", "y"].contains(&v.as_str()) => true,
        Some(ref v) if ["0", "false", "f", "no", "n"].contains(&v.as_str()) => false,
        _ => default,
    }
}
