// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Protobuf models for the tierconf remote configuration service.
//!
//! The messages are declared with `prost` derives directly instead of being
//! generated from a `.proto` file, so the crate builds without `protoc`. Field
//! tags are part of the wire contract and must never be renumbered.

#![doc = include_str!("../README.md")]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Route of the `Set` call, relative to the service endpoint.
pub const SET_PATH: &str = "/tierconf.v1.ConfigService/Set";
/// Route of the `Get` call, relative to the service endpoint.
pub const GET_PATH: &str = "/tierconf.v1.ConfigService/Get";
/// Route of the `All` call, relative to the service endpoint.
pub const ALL_PATH: &str = "/tierconf.v1.ConfigService/All";
/// Route of the `Remove` call, relative to the service endpoint.
pub const REMOVE_PATH: &str = "/tierconf.v1.ConfigService/Remove";

/// Content type carried by every request and response body.
pub const CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SetRequest {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// `ok == false` means the service refused the write; `error` explains why.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SetResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, tag = "2")]
    pub error: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetRequest {
    #[prost(string, tag = "1")]
    pub key: String,
}

/// `found` distinguishes an absent key from a key holding an empty value.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetResponse {
    #[prost(string, tag = "1")]
    pub value: String,
    #[prost(bool, tag = "2")]
    pub found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AllRequest {}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigItem {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct AllResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<ConfigItem>,
}

impl AllResponse {
    /// Builds a response from any key/value iterator.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: entries
                .into_iter()
                .map(|(key, value)| ConfigItem {
                    key: key.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Collapses the item list into a map. Later items win on duplicate keys.
    pub fn into_map(self) -> HashMap<String, String> {
        self.items
            .into_iter()
            .map(|item| (item.key, item.value))
            .collect()
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveRequest {
    #[prost(string, tag = "1")]
    pub key: String,
}

/// `ok` reports whether the key existed and was deleted.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, tag = "2")]
    pub error: String,
}
