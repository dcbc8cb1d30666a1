use std::collections::HashMap;
use std::sync::Mutex;

use crate::transport::{TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};

const BASE_PATH: &str = "/api/v2/";

/// In-memory upstream keyed by `"METHOD relative/path"`. Unscripted calls
/// answer 404, like the marketplace does for a path that does not apply.
pub(crate) struct ScriptedTransport {
    routes: HashMap<String, Result<UpstreamResponse, TransportError>>,
    seen: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn on(self, key: &str, status: u16, body: serde_json::Value) -> Self {
        self.on_raw(key, status, &body.to_string())
    }

    pub(crate) fn on_raw(mut self, key: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            key.to_string(),
            Ok(UpstreamResponse {
                status,
                body: body.to_string(),
            }),
        );
        self
    }

    pub(crate) fn unreachable(mut self, key: &str) -> Self {
        self.routes.insert(
            key.to_string(),
            Err(TransportError::Connection("connection refused".to_string())),
        );
        self
    }

    fn seen(&self) -> Vec<UpstreamRequest> {
        self.seen.lock().expect("transport log poisoned").clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.seen().iter().map(key_of).collect()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.seen()
            .iter()
            .map(|r| r.url.query().unwrap_or_default().to_string())
            .collect()
    }

    pub(crate) fn last_request(&self) -> Option<UpstreamRequest> {
        self.seen().pop()
    }
}

fn key_of(request: &UpstreamRequest) -> String {
    let path = request.url.path();
    format!(
        "{} {}",
        request.method,
        path.strip_prefix(BASE_PATH).unwrap_or(path)
    )
}

impl UpstreamTransport for ScriptedTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let key = key_of(&request);
        self.seen
            .lock()
            .expect("transport log poisoned")
            .push(request);
        self.routes.get(&key).cloned().unwrap_or_else(|| {
            Ok(UpstreamResponse {
                status: 404,
                body: r#"{"detail":"Not Found"}"#.to_string(),
            })
        })
    }
}
