use serde::Serialize;
use utoipa::ToSchema;

use crowdgate_core::{LogicalOperation, ResolveParams, Resolved};

use crate::error::AppError;
use crate::state::AppState;

pub mod campaigns;
pub mod health;
pub mod tasks;

/// Envelope for single-record and write responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub success: bool,
    /// Upstream record or acknowledgement; `null` when the upstream returned nothing.
    pub data: serde_json::Value,
    /// Upstream path that answered. Absent for a degraded read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_endpoint: Option<String>,
}

impl From<Resolved> for ProxyResponse {
    fn from(resolved: Resolved) -> Self {
        let source = resolved.result.source_endpoint;
        Self {
            success: true,
            data: resolved
                .result
                .items
                .into_iter()
                .next()
                .unwrap_or(serde_json::Value::Null),
            source_endpoint: (!source.is_empty()).then_some(source),
        }
    }
}

pub(crate) async fn resolve(
    state: &AppState,
    operation: LogicalOperation,
    params: &ResolveParams,
) -> Result<Resolved, AppError> {
    state
        .resolver
        .resolve(operation, params)
        .await
        .into_result()
        .map_err(AppError::from)
}

/// Trimmed, non-empty optional string.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
