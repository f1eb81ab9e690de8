// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-process fake of the remote configuration service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use prost::Message;
use tierconf_proto::{
    AllResponse, GetRequest, GetResponse, RemoveRequest, RemoveResponse, SetRequest, SetResponse,
    ALL_PATH, CONTENT_TYPE, GET_PATH, REMOVE_PATH, SET_PATH,
};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// Backend state shared with the request handlers.
#[derive(Default)]
struct ServiceState {
    /// Entries held by the fake service.
    values: Mutex<HashMap<String, String>>,
    /// Latency injected before every response.
    delay: Mutex<Duration>,
    /// When set, `Set` calls answer `ok = false`.
    reject_sets: AtomicBool,
    /// Number of requests received, across all routes.
    requests: AtomicUsize,
}

/// Running fake service. Dropping it shuts the server down.
pub struct FakeConfigService {
    endpoint: String,
    state: Arc<ServiceState>,
    _runtime: Runtime,
}

impl FakeConfigService {
    /// Binds an ephemeral port and serves the four configuration routes.
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to build runtime");
        let state = Arc::new(ServiceState::default());
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("failed to bind fake service");
        let addr = listener.local_addr().expect("failed to read local addr");

        let router = Router::new()
            .route(SET_PATH, post(handle_set))
            .route(GET_PATH, post(handle_get))
            .route(ALL_PATH, post(handle_all))
            .route(REMOVE_PATH, post(handle_remove))
            .with_state(Arc::clone(&state));
        runtime.spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            endpoint: addr.to_string(),
            state,
            _runtime: runtime,
        }
    }

    /// `host:port` of the running service.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn reject_sets(&self, reject: bool) {
        self.state.reject_sets.store(reject, Ordering::SeqCst);
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.state
            .values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
    }

    pub fn values(&self) -> HashMap<String, String> {
        self.state.values.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

fn protobuf<M: Message>(message: &M) -> Response {
    (
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        message.encode_to_vec(),
    )
        .into_response()
}

async fn before_response(state: &ServiceState) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn handle_set(State(state): State<Arc<ServiceState>>, body: Bytes) -> Response {
    before_response(&state).await;
    let Ok(request) = SetRequest::decode(body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if state.reject_sets.load(Ordering::SeqCst) {
        return protobuf(&SetResponse {
            ok: false,
            error: "read-only".to_string(),
        });
    }
    state
        .values
        .lock()
        .unwrap()
        .insert(request.key, request.value);
    protobuf(&SetResponse {
        ok: true,
        error: String::new(),
    })
}

async fn handle_get(State(state): State<Arc<ServiceState>>, body: Bytes) -> Response {
    before_response(&state).await;
    let Ok(request) = GetRequest::decode(body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let value = state.values.lock().unwrap().get(&request.key).cloned();
    protobuf(&GetResponse {
        found: value.is_some(),
        value: value.unwrap_or_default(),
    })
}

async fn handle_all(State(state): State<Arc<ServiceState>>) -> Response {
    before_response(&state).await;
    let values = state.values.lock().unwrap().clone();
    protobuf(&AllResponse::from_entries(values))
}

async fn handle_remove(State(state): State<Arc<ServiceState>>, body: Bytes) -> Response {
    before_response(&state).await;
    let Ok(request) = RemoveRequest::decode(body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let removed = state.values.lock().unwrap().remove(&request.key).is_some();
    protobuf(&RemoveResponse {
        ok: removed,
        error: String::new(),
    })
}
