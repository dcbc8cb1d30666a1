use axum::extract::{Path, State};
use axum::{Json, Router, routing::put};
use serde_json::Value;

use crowdgate_core::error::ApiError;
use crowdgate_core::{LogicalOperation, ResolveParams};

use crate::error::AppError;
use crate::extract::{AppJson, UpstreamApiKey};
use crate::routes::{ProxyResponse, resolve};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns/{campaign_id}", put(update_campaign))
        .route("/campaigns/{campaign_id}/{action}", put(campaign_action))
}

#[utoipa::path(
    put,
    path = "/campaigns/{campaign_id}/{action}",
    params(
        ("campaign_id" = String, Path, description = "Campaign id"),
        ("action" = String, Path, description = "pause, resume, stop or restart"),
        ("x-api-key" = Option<String>, Header, description = "Marketplace API key; overrides the configured default")
    ),
    responses(
        (status = 200, description = "Action accepted", body = ProxyResponse),
        (status = 400, description = "Unknown action", body = ApiError),
        (status = 502, description = "Every campaign path failed", body = ApiError)
    ),
    tag = "campaigns"
)]
pub async fn campaign_action(
    State(state): State<AppState>,
    Path((campaign_id, action)): Path<(String, String)>,
    UpstreamApiKey(api_key): UpstreamApiKey,
) -> Result<Json<ProxyResponse>, AppError> {
    let operation = LogicalOperation::from_campaign_action(&action).map_err(|error| {
        AppError::Resolution(crowdgate_core::ResolutionFailure {
            error,
            attempts: Vec::new(),
        })
    })?;
    let params = ResolveParams::for_campaign(campaign_id).api_key(api_key);

    let resolved = resolve(&state, operation, &params).await?;
    Ok(Json(resolved.into()))
}

#[utoipa::path(
    put,
    path = "/campaigns/{campaign_id}",
    request_body(content = Value, description = "Campaign fields, forwarded to the marketplace unchanged"),
    params(
        ("campaign_id" = String, Path, description = "Campaign id"),
        ("x-api-key" = Option<String>, Header, description = "Marketplace API key; overrides the configured default")
    ),
    responses(
        (status = 200, description = "Campaign updated", body = ProxyResponse),
        (status = 400, description = "Body is not a JSON object", body = ApiError),
        (status = 502, description = "Every campaign path failed", body = ApiError)
    ),
    tag = "campaigns"
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    UpstreamApiKey(api_key): UpstreamApiKey,
    AppJson(body): AppJson<Value>,
) -> Result<Json<ProxyResponse>, AppError> {
    if !body.is_object() {
        return Err(AppError::Validation {
            message: "campaign update must be a JSON object".to_string(),
            field: Some("body".to_string()),
            received: Some(body),
            docs_hint: None,
        });
    }
    let params = ResolveParams::for_campaign(campaign_id)
        .body(body)
        .api_key(api_key);

    let resolved = resolve(&state, LogicalOperation::UpdateCampaign, &params).await?;
    Ok(Json(resolved.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{send, spawn_upstream, state_for};

    use super::*;

    #[tokio::test]
    async fn pause_falls_back_to_hire_group_campaign() {
        let upstream = spawn_upstream(&[(
            "PUT hire-group-campaigns/42/pause",
            200,
            json!({"id": "42", "status": "PAUSED"}),
        )])
        .await;

        let (status, body) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42/Pause",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "PAUSED");
        assert_eq!(
            upstream.routes_called(),
            vec!["PUT basic-campaigns/42/pause", "PUT hire-group-campaigns/42/pause"]
        );
    }

    #[tokio::test]
    async fn empty_acknowledgement_is_success_with_null_data() {
        let upstream = spawn_upstream(&[("PUT basic-campaigns/42/stop", 200, Value::Null)]).await;

        let (status, body) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42/stop",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected_before_any_call() {
        let upstream = spawn_upstream(&[]).await;

        let (status, body) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42/archive",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown_operation");
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn update_forwards_body_verbatim() {
        let upstream = spawn_upstream(&[("PUT basic-campaigns/42", 200, json!({"ok": true}))]).await;
        let update = json!({"title": "Backlink check", "maxPositions": 50});

        let (status, _) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42",
            Some("caller-key"),
            Some(update.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let call = upstream.calls().pop().expect("one call");
        let sent: Value = serde_json::from_str(&call.body).expect("json body");
        assert_eq!(sent, update);
        assert_eq!(call.api_key.as_deref(), Some("caller-key"));
    }

    #[tokio::test]
    async fn update_rejects_non_object_body() {
        let upstream = spawn_upstream(&[]).await;

        let (status, body) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42",
            None,
            Some(json!(["not", "an", "object"])),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn writes_do_not_degrade_when_every_path_is_missing() {
        let upstream = spawn_upstream(&[]).await;

        let (status, body) = send(
            router().with_state(state_for(&upstream.base_url)),
            Method::PUT,
            "/campaigns/42/resume",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "upstream_rejected");
        assert_eq!(body["attempts"].as_array().map(Vec::len), Some(2));
    }
}
