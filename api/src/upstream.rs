use std::time::Duration;

use crowdgate_core::{HttpMethod, TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};

/// Header the marketplace reads the account key from.
pub const API_KEY_HEADER: &str = "MicroworkersApiKey";

const USER_AGENT: &str = concat!("crowdgate/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport. The client-level timeout bounds every attempt.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl UpstreamTransport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = request.api_key.as_deref() {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_send_error)?;

        tracing::debug!(status, bytes = body.len(), "upstream responded");
        Ok(UpstreamResponse { status, body })
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(err.without_url().to_string())
    }
}
