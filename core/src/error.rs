use serde::Serialize;
use utoipa::ToSchema;

use crate::resolver::AttemptRecord;

/// Structured error response returned by the proxy.
/// Every error carries enough information for the dashboard to show what
/// went wrong and, for upstream failures, which endpoints were tried.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "upstream_rejected")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
    /// Every upstream candidate that was tried before giving up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<AttemptRecord>>,
}

/// Error codes used across the proxy
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const UNKNOWN_OPERATION: &str = "unknown_operation";
    pub const MISSING_PARAMETER: &str = "missing_parameter";
    pub const UPSTREAM_REJECTED: &str = "upstream_rejected";
    pub const INVALID_UPSTREAM_RESPONSE: &str = "invalid_upstream_response";
    pub const UPSTREAM_UNREACHABLE: &str = "upstream_unreachable";
    pub const RATE_LIMITED: &str = "rate_limited";
}

/// Failure taxonomy of a single resolution attempt (or of the whole call).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("missing value for '{placeholder}' required by {endpoint}")]
    MissingParameter {
        placeholder: String,
        endpoint: String,
    },

    #[error("invalid upstream response from {endpoint}: {reason}")]
    InvalidUpstreamResponse { endpoint: String, reason: String },

    /// Non-2xx answer. `message` is the most specific text found in the body.
    #[error("{message}")]
    UpstreamRejected {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("upstream unreachable at {endpoint}: {message}")]
    UpstreamUnreachable { endpoint: String, message: String },
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownOperation(_) => codes::UNKNOWN_OPERATION,
            Self::MissingParameter { .. } => codes::MISSING_PARAMETER,
            Self::InvalidUpstreamResponse { .. } => codes::INVALID_UPSTREAM_RESPONSE,
            Self::UpstreamRejected { .. } => codes::UPSTREAM_REJECTED,
            Self::UpstreamUnreachable { .. } => codes::UPSTREAM_UNREACHABLE,
        }
    }

    /// HTTP status of the upstream answer, when there was one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 404 and 400 mean "this candidate does not apply here".
    pub fn is_not_applicable(&self) -> bool {
        matches!(self.upstream_status(), Some(400 | 404))
    }

    /// Whether this failure, as the last one of a read, degrades to an empty result.
    pub fn degrades_to_empty(&self) -> bool {
        match self {
            Self::UpstreamRejected { status, .. } => *status == 404 || *status >= 500,
            Self::UpstreamUnreachable { .. } => true,
            _ => false,
        }
    }
}

/// Rank of the text carried by an upstream error, lower is more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum DetailRank {
    Detail,
    Message,
    Violations,
    Raw,
}

/// Pull the most specific message out of an upstream error body:
/// `detail` > `message` > `violations` > raw text. Structured values are
/// stringified at their own rank; blank or empty values count as absent.
pub(crate) fn upstream_error_detail(status: u16, body: &str) -> (DetailRank, String) {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for (key, rank) in [
            ("detail", DetailRank::Detail),
            ("message", DetailRank::Message),
            ("violations", DetailRank::Violations),
        ] {
            if let Some(text) = map.get(key).and_then(field_text) {
                return (rank, text);
            }
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        (DetailRank::Raw, format!("upstream returned HTTP {status}"))
    } else {
        (DetailRank::Raw, raw.to_string())
    }
}

fn field_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(text) => (!text.trim().is_empty()).then(|| text.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other.to_string()),
    }
}
