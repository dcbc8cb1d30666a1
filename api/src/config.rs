use std::time::Duration;

use crowdgate_core::config::{ConfigError, DEFAULT_TIMEOUT, DEFAULT_UPSTREAM_URL};
use crowdgate_core::UpstreamConfig;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = var("CROWDGATE_UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let timeout = match var("CROWDGATE_UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid CROWDGATE_UPSTREAM_TIMEOUT_SECS");
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };
        let upstream = UpstreamConfig::new(&base_url)?
            .with_default_api_key(var("CROWDGATE_API_KEY"))
            .with_timeout(timeout);

        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = var("CROWDGATE_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            upstream,
            port,
            cors_origins,
        })
    }
}
