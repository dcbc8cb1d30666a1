use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crowdgate_core::error::{self, ApiError};
use crowdgate_core::{ResolutionFailure, ResolveError};

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Every upstream candidate failed
    Resolution(ResolutionFailure),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Resolution(failure) => match &failure.error {
                ResolveError::UnknownOperation(_) | ResolveError::MissingParameter { .. } => {
                    StatusCode::BAD_REQUEST
                }
                // Client errors are the caller's to fix; pass them through.
                ResolveError::UpstreamRejected { status, .. } if (400..500).contains(status) => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ResolveError::UpstreamRejected { .. } | ResolveError::InvalidUpstreamResponse { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                ResolveError::UpstreamUnreachable { .. } => StatusCode::GATEWAY_TIMEOUT,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        let status = self.status();

        let api_error = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => ApiError {
                error: error::codes::VALIDATION_FAILED.to_string(),
                message,
                field,
                received,
                request_id,
                docs_hint,
                attempts: None,
            },
            AppError::Resolution(ResolutionFailure { error, attempts }) => {
                tracing::warn!(
                    code = error.code(),
                    status = %status,
                    attempts = attempts.len(),
                    "upstream resolution failed: {}",
                    error
                );
                let docs_hint = match &error {
                    ResolveError::MissingParameter { placeholder, .. } => Some(format!(
                        "Supply '{placeholder}' (campaignId can also be derived from a composite task id)."
                    )),
                    ResolveError::UpstreamUnreachable { .. } => Some(
                        "The marketplace API did not answer in time. Retry later.".to_string(),
                    ),
                    _ => None,
                };
                ApiError {
                    error: error.code().to_string(),
                    message: error.to_string(),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint,
                    attempts: (!attempts.is_empty()).then_some(attempts),
                }
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<ResolutionFailure> for AppError {
    fn from(failure: ResolutionFailure) -> Self {
        AppError::Resolution(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(error: ResolveError) -> AppError {
        AppError::Resolution(ResolutionFailure {
            error,
            attempts: Vec::new(),
        })
    }

    fn rejected(status: u16) -> ResolveError {
        ResolveError::UpstreamRejected {
            endpoint: "slots/1/rate".to_string(),
            status,
            message: "nope".to_string(),
        }
    }

    #[test]
    fn upstream_client_errors_pass_through() {
        assert_eq!(failure(rejected(422)).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(failure(rejected(404)).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_server_errors_become_bad_gateway() {
        assert_eq!(failure(rejected(503)).status(), StatusCode::BAD_GATEWAY);
        let invalid = ResolveError::InvalidUpstreamResponse {
            endpoint: "x".to_string(),
            reason: "body is not JSON".to_string(),
        };
        assert_eq!(failure(invalid).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unreachable_upstream_is_gateway_timeout() {
        let unreachable = ResolveError::UpstreamUnreachable {
            endpoint: "x".to_string(),
            message: "request timed out".to_string(),
        };
        assert_eq!(failure(unreachable).status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn caller_mistakes_are_bad_requests() {
        assert_eq!(
            failure(ResolveError::UnknownOperation("archive".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        let missing = ResolveError::MissingParameter {
            placeholder: "campaign_id".to_string(),
            endpoint: "basic-campaigns/{campaign_id}/slots".to_string(),
        };
        assert_eq!(failure(missing).status(), StatusCode::BAD_REQUEST);
    }
}
