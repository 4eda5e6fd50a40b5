//! Mock Infoblox WAPI holding a single extensible attribute definition.
//!
//! The mock is stateful: a successful PUT replaces the stored values, so a
//! verification read or a second run sees the update.

use crate::server::{self, RecordedRequest};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use locsync_core::infoblox::DEFINITION_OBJECT;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

/// WAPI base path served by the mock.
pub const WAPI_BASE: &str = "/wapi/v2.12";
/// `_ref` of the mocked definition.
pub const TEST_REFERENCE: &str =
    "extensibleattributedef/b25lLmV4dGVuc2libGVfYXR0cmlidXRlX2RlZiQuTG9jYXRpb24:Location";

struct MockState {
    name: String,
    /// `None` means the definition does not exist.
    values: Mutex<Option<Vec<String>>>,
    get_failure: Mutex<Option<(StatusCode, String)>>,
    put_failure: Mutex<Option<(StatusCode, String)>>,
    get_raw_body: Mutex<Option<String>>,
    put_status: Mutex<StatusCode>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process Infoblox stand-in; every request is recorded.
pub struct MockInfoblox {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockInfoblox {
    /// Start with an empty `Location` definition.
    pub async fn start() -> Self {
        Self::start_with("Location", &[]).await
    }

    pub async fn start_with(name: &str, values: &[&str]) -> Self {
        let state = Arc::new(MockState {
            name: name.to_string(),
            values: Mutex::new(Some(values.iter().map(|v| v.to_string()).collect())),
            get_failure: Mutex::new(None),
            put_failure: Mutex::new(None),
            get_raw_body: Mutex::new(None),
            put_status: Mutex::new(StatusCode::OK),
            requests: Mutex::new(Vec::new()),
        });
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));
        let addr = server::spawn(router).await;
        Self { addr, state }
    }

    /// WAPI base URL to put into the config.
    pub fn endpoint(&self) -> String {
        format!("http://{}{WAPI_BASE}", self.addr)
    }

    /// Current allowed values, or `None` when the definition is absent.
    pub fn values(&self) -> Option<Vec<String>> {
        self.state.values.lock().clone()
    }

    pub fn set_values(&self, values: &[&str]) {
        *self.state.values.lock() = Some(values.iter().map(|v| v.to_string()).collect());
    }

    pub fn remove_definition(&self) {
        *self.state.values.lock() = None;
    }

    pub fn fail_get(&self, status: u16, body: &str) {
        *self.state.get_failure.lock() = Some((status_code(status), body.to_string()));
    }

    pub fn fail_put(&self, status: u16, body: &str) {
        *self.state.put_failure.lock() = Some((status_code(status), body.to_string()));
    }

    /// Status returned by successful PUTs (200 unless changed).
    pub fn set_put_status(&self, status: u16) {
        *self.state.put_status.lock() = status_code(status);
    }

    /// Answer definition reads with a body that is served verbatim.
    pub fn respond_raw_get(&self, body: &str) {
        *self.state.get_raw_body.lock() = Some(body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn put_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(RecordedRequest::is_put)
            .collect()
    }

    pub fn get_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == Method::GET.as_str())
            .count()
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("valid status")
}

/// Values of a `{"list_values": [{"value": ...}]}` payload.
pub fn payload_values(body: &Value) -> Option<Vec<String>> {
    body.get("list_values")?
        .as_array()?
        .iter()
        .map(|entry| entry.get("value")?.as_str().map(str::to_string))
        .collect()
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest::capture(&method, &uri, &headers, &body);
    state.requests.lock().push(request.clone());

    let definitions_path = format!("{WAPI_BASE}/{DEFINITION_OBJECT}");
    let reference_path = format!("{WAPI_BASE}/{TEST_REFERENCE}");

    if method == Method::GET && request.path == definitions_path {
        if let Some((status, body)) = state.get_failure.lock().clone() {
            return (status, body).into_response();
        }
        if let Some(raw) = state.get_raw_body.lock().clone() {
            return (StatusCode::OK, raw).into_response();
        }
        let wanted = request.query_param("name").unwrap_or_default();
        let values = state.values.lock().clone();
        return match values {
            Some(values) if wanted == state.name => {
                let list_values: Vec<Value> =
                    values.iter().map(|value| json!({ "value": value })).collect();
                Json(json!([{ "_ref": TEST_REFERENCE, "list_values": list_values }]))
                    .into_response()
            }
            _ => Json(json!([])).into_response(),
        };
    }

    if method == Method::PUT && request.path == reference_path {
        if let Some((status, body)) = state.put_failure.lock().clone() {
            return (status, body).into_response();
        }
        let Some(values) = request.body.as_ref().and_then(payload_values) else {
            return (StatusCode::BAD_REQUEST, "malformed list_values").into_response();
        };
        *state.values.lock() = Some(values);
        let status = *state.put_status.lock();
        return (status, Json(json!(TEST_REFERENCE))).into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}
