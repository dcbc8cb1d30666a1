use std::future::Future;

use url::Url;

use crate::candidate::HttpMethod;

/// One physical call the resolver wants made.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: Url,
    pub body: Option<serde_json::Value>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Connection(String),
}

/// Network seam of the resolver. Each `send` is one bounded request; the
/// implementation is responsible for enforcing the per-attempt timeout.
pub trait UpstreamTransport: Send + Sync {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}
