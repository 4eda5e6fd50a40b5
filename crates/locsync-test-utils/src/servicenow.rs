//! Mock ServiceNow table API serving `cmn_location`.

use crate::server::{self, RecordedRequest};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use locsync_core::servicenow::LOCATION_TABLE_PATH;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    rows: Mutex<Vec<Value>>,
    failure: Mutex<Option<(StatusCode, String)>>,
    raw_body: Mutex<Option<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process ServiceNow stand-in; every request is recorded.
pub struct MockServiceNow {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockServiceNow {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));
        let addr = server::spawn(router).await;
        Self { addr, state }
    }

    /// Instance base URL to put into the config.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve one `{"name": ...}` row per entry.
    pub fn set_names(&self, names: &[&str]) {
        let rows = names.iter().map(|name| json!({ "name": name })).collect();
        self.set_rows(rows);
    }

    /// Serve arbitrary rows inside `{"result": [...]}`.
    pub fn set_rows(&self, rows: Vec<Value>) {
        *self.state.rows.lock() = rows;
    }

    pub fn fail_with(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        *self.state.failure.lock() = Some((status, body.to_string()));
    }

    /// Answer 200 with a body that is served verbatim.
    pub fn respond_raw(&self, body: &str) {
        *self.state.raw_body.lock() = Some(body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state
        .requests
        .lock()
        .push(RecordedRequest::capture(&method, &uri, &headers, &body));

    if method != Method::GET || uri.path() != LOCATION_TABLE_PATH {
        return StatusCode::NOT_FOUND.into_response();
    }
    if let Some((status, body)) = state.failure.lock().clone() {
        return (status, body).into_response();
    }
    if let Some(raw) = state.raw_body.lock().clone() {
        return (StatusCode::OK, raw).into_response();
    }
    let rows = state.rows.lock().clone();
    Json(json!({ "result": rows })).into_response()
}
