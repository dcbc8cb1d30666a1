use std::time::Duration;

use url::Url;

use crate::candidate::RenderedPath;

pub const DEFAULT_UPSTREAM_URL: &str = "https://ttv.microworkers.com/api/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_PATH: &str = "/api/v2";
const LEGACY_API_SUFFIX: &str = "/api.php";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid upstream base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

/// Immutable upstream settings, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    base_url: Url,
    default_api_key: Option<String>,
    timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            default_api_key: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_default_api_key(mut self, key: Option<String>) -> Self {
        self.default_api_key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn has_default_api_key(&self) -> bool {
        self.default_api_key.is_some()
    }

    /// A non-blank per-request key overrides the process-wide default.
    pub fn effective_api_key(&self, per_request: Option<&str>) -> Option<String> {
        per_request
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_api_key.clone())
    }

    /// Absolute URL of a rendered candidate path. Segments are percent-encoded.
    pub fn endpoint_url(&self, path: &RenderedPath) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path.segments());
        }
        url
    }
}

/// Canonical form of a configured base URL.
///
/// - must be an absolute http(s) URL
/// - a bare host gets the `/api/v2` path
/// - the legacy `/api.php` entry point is rewritten to `/api/v2`
/// - trailing slashes, query and fragment are dropped
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("URL has no host".to_string()));
    }

    let path = url.path().trim_end_matches('/').to_string();
    let path = if path.is_empty() {
        API_PATH.to_string()
    } else if let Some(prefix) = path.strip_suffix(LEGACY_API_SUFFIX) {
        format!("{prefix}{API_PATH}")
    } else {
        path
    };

    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
