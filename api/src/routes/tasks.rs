use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::put};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use crowdgate_core::error::ApiError;
use crowdgate_core::{LogicalOperation, Pagination, Rating, ResolveParams};

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery, UpstreamApiKey};
use crate::routes::{ProxyResponse, non_blank, resolve};
use crate::state::AppState;

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/{task_id}", get(get_task))
}

pub fn write_router() -> Router<AppState> {
    Router::new().route("/tasks/{task_id}/rate", put(rate_task))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Campaign whose tasks to list
    #[serde(default)]
    pub campaign_id: Option<String>,
    /// Status filter, dashboard vocabulary (e.g. SUBMITTED, COMPLETED, NEEDS_REVISION)
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Opaque token from a previous page's `nextPageToken`
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CampaignScope {
    /// Needed unless the task id is composite
    #[serde(default)]
    pub campaign_id: Option<String>,
}

/// Task list. `tasks`, `items` and `slots` carry the same array so that every
/// dashboard widget finds the key it reads.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub tasks: Vec<Value>,
    pub items: Vec<Value>,
    pub slots: Vec<Value>,
    pub total: u64,
    pub source_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RateTaskRequest {
    /// OK, NOK or REVISE
    #[schema(value_type = Rating)]
    pub rating: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[utoipa::path(
    get,
    path = "/tasks",
    params(
        ListTasksQuery,
        ("x-api-key" = Option<String>, Header, description = "Marketplace API key; overrides the configured default")
    ),
    responses(
        (status = 200, description = "Tasks of the campaign; empty when the upstream has none", body = TaskListResponse),
        (status = 400, description = "Missing campaignId", body = ApiError),
        (status = 502, description = "Upstream answered with an unusable body", body = ApiError)
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    UpstreamApiKey(api_key): UpstreamApiKey,
    AppQuery(query): AppQuery<ListTasksQuery>,
) -> Result<Json<TaskListResponse>, AppError> {
    let params = ResolveParams::default()
        .campaign(non_blank(query.campaign_id))
        .status(non_blank(query.status))
        .page(Pagination {
            page_size: query.page_size,
            page_token: non_blank(query.page_token),
        })
        .api_key(api_key);

    let resolved = resolve(&state, LogicalOperation::ListTasks, &params).await?;
    let result = resolved.result;

    Ok(Json(TaskListResponse {
        tasks: result.items.clone(),
        items: result.items.clone(),
        slots: result.items,
        total: result.total,
        source_endpoint: result.source_endpoint,
        next_page_token: result.next_page_token,
    }))
}

#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    params(
        ("task_id" = String, Path, description = "Slot id or composite task id"),
        CampaignScope,
        ("x-api-key" = Option<String>, Header, description = "Marketplace API key; overrides the configured default")
    ),
    responses(
        (status = 200, description = "Task record; data is null when the upstream has none", body = ProxyResponse),
        (status = 502, description = "Upstream answered with an unusable body", body = ApiError)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    UpstreamApiKey(api_key): UpstreamApiKey,
    AppQuery(scope): AppQuery<CampaignScope>,
) -> Result<Json<ProxyResponse>, AppError> {
    let params = ResolveParams::for_task(task_id)
        .campaign(non_blank(scope.campaign_id))
        .api_key(api_key);

    let resolved = resolve(&state, LogicalOperation::GetTaskDetail, &params).await?;
    Ok(Json(resolved.into()))
}

#[utoipa::path(
    put,
    path = "/tasks/{task_id}/rate",
    request_body = RateTaskRequest,
    params(
        ("task_id" = String, Path, description = "Slot id or composite task id ({campaignId}_{type}_{hash}_{slotId})"),
        CampaignScope,
        ("x-api-key" = Option<String>, Header, description = "Marketplace API key; overrides the configured default")
    ),
    responses(
        (status = 200, description = "Rating accepted", body = ProxyResponse),
        (status = 400, description = "Invalid rating", body = ApiError),
        (status = 502, description = "Every rating path failed", body = ApiError),
        (status = 504, description = "Upstream unreachable", body = ApiError)
    ),
    tag = "tasks"
)]
pub async fn rate_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    UpstreamApiKey(api_key): UpstreamApiKey,
    AppQuery(scope): AppQuery<CampaignScope>,
    AppJson(req): AppJson<RateTaskRequest>,
) -> Result<Json<ProxyResponse>, AppError> {
    let rating: Rating = req.rating.parse().map_err(|_| AppError::Validation {
        message: format!("rating must be one of OK, NOK, REVISE (got '{}')", req.rating),
        field: Some("rating".to_string()),
        received: Some(Value::String(req.rating.clone())),
        docs_hint: None,
    })?;

    let mut body = json!({ "rating": rating });
    if let Some(comment) = non_blank(req.comment) {
        body["comment"] = Value::String(comment);
    }

    let params = ResolveParams::for_task(task_id)
        .campaign(non_blank(scope.campaign_id))
        .body(body)
        .api_key(api_key);

    let resolved = resolve(&state, LogicalOperation::RateTask, &params).await?;
    Ok(Json(resolved.into()))
}
