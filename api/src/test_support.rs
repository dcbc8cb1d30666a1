//! Loopback fake of the marketplace API for route tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tower::ServiceExt;

use crowdgate_core::{Resolver, UpstreamConfig};

use crate::state::AppState;
use crate::upstream::{API_KEY_HEADER, ReqwestTransport};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// "METHOD relative/path", relative to `/api/v2/`.
    pub route: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct Script {
    routes: Arc<HashMap<String, (u16, String)>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeUpstream {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn routes_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.route).collect()
    }
}

/// Serve `routes` ("METHOD path" → status, JSON body) on an ephemeral port.
/// Anything unscripted answers 404 `{"detail":"Not Found"}`.
pub async fn spawn_upstream(routes: &[(&str, u16, Value)]) -> FakeUpstream {
    let script = Script {
        routes: Arc::new(
            routes
                .iter()
                .map(|(route, status, body)| (route.to_string(), (*status, body.to_string())))
                .collect(),
        ),
        calls: Arc::default(),
    };
    let calls = script.calls.clone();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().fallback(scripted).with_state(script);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    FakeUpstream {
        base_url: format!("http://{addr}/api/v2"),
        calls,
    }
}

/// Base URL of a port nothing listens on.
pub async fn closed_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/v2")
}

/// Base URL of an upstream that accepts connections but never answers in time.
pub async fn hanging_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        StatusCode::OK
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api/v2")
}

async fn scripted(
    State(script): State<Script>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().trim_start_matches("/api/v2/");
    let route = format!("{method} {path}");
    script.calls.lock().expect("calls lock").push(RecordedCall {
        route: route.clone(),
        query: uri.query().map(str::to_string),
        api_key: headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match script.routes.get(&route) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).expect("scripted status"),
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"detail": "Not Found"})),
        )
            .into_response(),
    }
}

pub fn state_for(base_url: &str) -> AppState {
    state_with_key(base_url, None)
}

pub fn state_with_key(base_url: &str, default_key: Option<&str>) -> AppState {
    build_state(base_url, default_key, Duration::from_secs(5))
}

pub fn state_with_timeout(base_url: &str, timeout: Duration) -> AppState {
    build_state(base_url, None, timeout)
}

fn build_state(base_url: &str, default_key: Option<&str>, timeout: Duration) -> AppState {
    let config = UpstreamConfig::new(base_url)
        .expect("test base url")
        .with_default_api_key(default_key.map(str::to_string))
        .with_timeout(timeout);
    let transport = ReqwestTransport::new(config.timeout()).expect("client builds");
    AppState::new(Resolver::new(config, transport))
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Run one request through `app` and return status plus JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header(crate::extract::API_KEY_HEADER, key);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    (status, body_json(response).await)
}
