//! Axum-based mock of the portal's passkey endpoints
//!
//! Every test starts its own server on an ephemeral port, scripts the
//! responses it needs, and inspects the requests the client sent.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// One request as the mock portal received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Clone, Default)]
pub struct MockPortal {
    responses: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request to `path` with `status` and `body`
    pub fn respond(&self, path: &str, status: StatusCode, body: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
        self
    }

    /// Answer `path` with 200 and the given JSON
    pub fn respond_json(&self, path: &str, body: &Value) -> &Self {
        self.respond(path, StatusCode::OK, body.to_string())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Start serving on 127.0.0.1 and return the base URL
    pub async fn start(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock portal");
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(
    State(portal): State<MockPortal>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    portal.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let scripted = portal.responses.lock().unwrap().get(&path).cloned();
    match scripted {
        Some((status, body)) => {
            let content_type = if body.starts_with('{') || body.starts_with('[') {
                "application/json"
            } else {
                "text/plain; charset=utf-8"
            };
            (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// A base URL nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
