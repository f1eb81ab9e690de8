// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Raised when an override delegate does not provide the full capability set.
///
/// This is the only failure that crosses the [`crate::ConfigClient`] boundary;
/// the previously installed override (if any) stays in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("config delegate is missing required capabilities: {}", .0.join(", "))]
    MissingCapabilities(Vec<&'static str>),
}

/// Errors returned while validating [`crate::ClientSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
