//! Shared plumbing for the axum-backed mock servers.

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, Uri, header};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A request as seen by a mock server.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub(crate) fn capture(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> Self {
        let query = uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        Self {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            authorization: header_value(header::AUTHORIZATION),
            accept: header_value(header::ACCEPT),
            body: serde_json::from_slice(body).ok(),
        }
    }

    /// First value of a decoded query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_put(&self) -> bool {
        self.method == Method::PUT.as_str()
    }
}

/// Serve `router` on an ephemeral localhost port for the rest of the test.
pub(crate) async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Address of a port that was bound and released, so nothing listens there.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}
