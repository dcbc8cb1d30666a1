//! Extractors that turn axum rejections into structured `AppError` responses.
//!
//! `AppJson<T>` and `AppQuery<T>` replace `axum::Json<T>` and `axum::extract::Query<T>`
//! in handler signatures; deserialization failures become `AppError::Validation`
//! instead of axum's plain-text rejections.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};

use crate::error::AppError;

/// Inbound header carrying a per-request marketplace key.
pub const API_KEY_HEADER: &str = "x-api-key";

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => {
                let body_text = rejection.body_text();
                Err(AppError::Validation {
                    field: extract_field_from_serde_message(&body_text),
                    message: format!("Invalid query string: {body_text}"),
                    received: parts.uri.query().map(|q| serde_json::Value::String(q.to_string())),
                    docs_hint: None,
                })
            }
        }
    }
}

/// Optional per-request API key from `x-api-key`. Blank values are treated as absent.
pub struct UpstreamApiKey(pub Option<String>);

impl<S> FromRequestParts<S> for UpstreamApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(API_KEY_HEADER) else {
            return Ok(UpstreamApiKey(None));
        };
        let key = value.to_str().map_err(|_| AppError::Validation {
            message: "x-api-key must be visible ASCII".to_string(),
            field: Some(API_KEY_HEADER.to_string()),
            received: None,
            docs_hint: None,
        })?;
        let key = key.trim();
        Ok(UpstreamApiKey((!key.is_empty()).then(|| key.to_string())))
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();

    // "missing field `rating`" → field = "rating"
    let field_hint = extract_field_from_serde_message(&body_text);

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field_hint.unwrap_or("body".to_string())),
        received: None,
        docs_hint: Some(
            "Check the request body against GET /api-doc/openapi.json.".to_string(),
        ),
    }
}

fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"]
        .iter()
        .find_map(|pattern| {
            let start = msg.find(pattern)? + pattern.len();
            let after = &msg[start..];
            let end = after.find('`')?;
            Some(after[..end].to_string())
        })
}
