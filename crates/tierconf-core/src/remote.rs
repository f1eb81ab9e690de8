// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client for the remote configuration service.
//!
//! Every call is a single protobuf-over-HTTP `POST` bounded by a deadline. There
//! are no retries: a failed attempt is returned once and the caller decides
//! whether to fall back.
//!
//! The client caches one channel (a pooled HTTP client bound to an endpoint).
//! The channel is rebuilt only when a call targets a different endpoint than
//! the cached one. Rebuilding happens under a dedicated mutex, and the channel
//! handle is cloned out before any I/O, so concurrent calls never serialise on
//! each other beyond the rebuild itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use prost::Message;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tierconf_proto::{
    AllRequest, AllResponse, GetRequest, GetResponse, RemoveRequest, RemoveResponse, SetRequest,
    SetResponse, ALL_PATH, GET_PATH, REMOVE_PATH, SET_PATH,
};
use tracing::debug;

/// Deadline applied to each remote call when none (or a non-positive one) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The endpoint could not be turned into a request URL.
    #[error("invalid remote endpoint: {0}")]
    InvalidEndpoint(String),
    /// The HTTP client could not be built or the request never completed.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The call did not complete before its deadline.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    /// The service answered with a non-success HTTP status.
    #[error("remote service returned status {0}")]
    Status(u16),
    /// The response body was not a valid protobuf message.
    #[error("failed to decode protobuf payload: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The service processed the call but refused it.
    #[error("remote service rejected the request: {0}")]
    Rejected(String),
}

impl RemoteError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::DeadlineExceeded(timeout)
        } else {
            Self::Transport(err)
        }
    }
}

/// Cached connection state: the normalised endpoint and the client bound to it.
#[derive(Debug, Clone)]
struct Channel {
    endpoint: String,
    base_url: Url,
    http: Client,
}

/// Explicitly constructed remote client, shareable across
/// [`crate::ConfigClient`]s through an `Arc`.
#[derive(Debug)]
pub struct RemoteConfigClient {
    timeout: Duration,
    channel: Mutex<Option<Channel>>,
    channels_built: AtomicUsize,
}

impl Default for RemoteConfigClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RemoteConfigClient {
    /// Creates a client whose calls are bounded by `timeout`.
    ///
    /// A zero timeout would fail every call immediately, so it is replaced with
    /// [`DEFAULT_TIMEOUT`].
    pub fn new(timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        Self {
            timeout,
            channel: Mutex::new(None),
            channels_built: AtomicUsize::new(0),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of channels built so far. Grows only when the endpoint changes.
    pub fn channels_built(&self) -> usize {
        self.channels_built.load(Ordering::Relaxed)
    }

    /// Stores `value` under `key`. A refusal reported by the service is an error.
    pub fn set(&self, endpoint: &str, key: &str, value: &str) -> Result<(), RemoteError> {
        let request = SetRequest {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let response: SetResponse = self.call(endpoint, SET_PATH, &request)?;
        if !response.ok {
            return Err(RemoteError::Rejected(response.error));
        }
        Ok(())
    }

    /// Reads `key`. `Ok(None)` means the service does not know the key.
    pub fn get(&self, endpoint: &str, key: &str) -> Result<Option<String>, RemoteError> {
        let request = GetRequest {
            key: key.to_owned(),
        };
        let response: GetResponse = self.call(endpoint, GET_PATH, &request)?;
        Ok(response.found.then_some(response.value))
    }

    pub fn all(&self, endpoint: &str) -> Result<HashMap<String, String>, RemoteError> {
        let response: AllResponse = self.call(endpoint, ALL_PATH, &AllRequest {})?;
        Ok(response.into_map())
    }

    /// Deletes `key`, returning the service's verdict on whether it removed anything.
    pub fn remove(&self, endpoint: &str, key: &str) -> Result<bool, RemoteError> {
        let request = RemoveRequest {
            key: key.to_owned(),
        };
        let response: RemoveResponse = self.call(endpoint, REMOVE_PATH, &request)?;
        Ok(response.ok)
    }

    fn call<Req, Resp>(
        &self,
        endpoint: &str,
        path: &str,
        request: &Req,
    ) -> Result<Resp, RemoteError>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let channel = self.channel(endpoint)?;
        let url = channel
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| RemoteError::InvalidEndpoint(channel.endpoint.clone()))?;

        let response = channel
            .http
            .post(url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static(tierconf_proto::CONTENT_TYPE),
            )
            .timeout(self.timeout)
            .body(request.encode_to_vec())
            .send()
            .map_err(|err| RemoteError::from_reqwest(err, self.timeout))?;

        classify_status(response.status())?;
        let bytes = response
            .bytes()
            .map_err(|err| RemoteError::from_reqwest(err, self.timeout))?;
        Ok(Resp::decode(bytes.as_ref())?)
    }

    /// Returns the cached channel for `endpoint`, rebuilding it if the endpoint changed.
    fn channel(&self, endpoint: &str) -> Result<Channel, RemoteError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let mut cached = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(channel) = cached.as_ref() {
            if channel.endpoint == endpoint {
                return Ok(channel.clone());
            }
        }

        // The URL gets a trailing slash so route joins append instead of replacing.
        let base_url = Url::parse(&format!("{endpoint}/"))
            .map_err(|_| RemoteError::InvalidEndpoint(endpoint.clone()))?;
        let http = Client::builder()
            .connect_timeout(self.timeout)
            .build()
            .map_err(RemoteError::Transport)?;
        debug!(endpoint = %endpoint, "built remote config channel");
        self.channels_built.fetch_add(1, Ordering::Relaxed);

        let channel = Channel {
            endpoint,
            base_url,
            http,
        };
        *cached = Some(channel.clone());
        Ok(channel)
    }
}

/// Turns `host:port` or a full URL into the canonical form used as the cache key.
fn normalize_endpoint(endpoint: &str) -> Result<String, RemoteError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidEndpoint(endpoint.to_owned()));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!("http://{trimmed}"))
    }
}

fn classify_status(status: StatusCode) -> Result<(), RemoteError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RemoteError::Status(status.as_u16()))
    }
}
