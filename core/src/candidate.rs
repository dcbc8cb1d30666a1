//! Declarative candidate tables: which upstream endpoints may implement a
//! logical operation, and in which order they are tried.
//!
//! Order encodes empirical reliability. Reordering a list changes which
//! endpoint answers a call, so treat it as a breaking change.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ResolveError;
use crate::operation::LogicalOperation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
        }
    }

    pub fn sends_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a 2xx body must look like for a candidate to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    /// A bare array, or an envelope carrying `slots`, `items` or `tasks`.
    Collection,
    /// A single JSON object.
    Record,
    /// Anything, including an empty body.
    Acknowledgement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    None,
    /// `pageSize` / `pageToken`
    Cursor,
    /// `limit` / `offset`; the page token is used as a numeric offset.
    Offset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

impl PaginationStyle {
    pub fn query(self, pagination: Option<&Pagination>) -> Vec<(String, String)> {
        let Some(pagination) = pagination else {
            return Vec::new();
        };
        let token = pagination
            .page_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let mut pairs = Vec::new();
        match self {
            Self::None => {}
            Self::Cursor => {
                if let Some(size) = pagination.page_size {
                    pairs.push(("pageSize".to_string(), size.to_string()));
                }
                if let Some(token) = token {
                    pairs.push(("pageToken".to_string(), token.to_string()));
                }
            }
            Self::Offset => {
                if let Some(size) = pagination.page_size {
                    pairs.push(("limit".to_string(), size.to_string()));
                }
                match token.map(str::parse::<u64>) {
                    Some(Ok(offset)) => pairs.push(("offset".to_string(), offset.to_string())),
                    Some(Err(_)) => {
                        tracing::debug!(
                            page_token = token.unwrap_or_default(),
                            "page token is not a numeric offset, dropping it"
                        );
                    }
                    None => {}
                }
            }
        }
        pairs
    }
}

/// One physical endpoint+method that may satisfy a logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointCandidate {
    /// Path relative to the upstream base, e.g. `basic-campaigns/{campaign_id}/slots`.
    /// Placeholders must occupy a whole segment.
    pub path_template: &'static str,
    pub method: HttpMethod,
    pub shape: ExpectedShape,
    pub pagination: PaginationStyle,
}

/// A candidate path with its placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPath {
    segments: Vec<String>,
}

impl RenderedPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RenderedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl EndpointCandidate {
    pub const fn new(method: HttpMethod, path_template: &'static str, shape: ExpectedShape) -> Self {
        Self {
            path_template,
            method,
            shape,
            pagination: PaginationStyle::None,
        }
    }

    pub const fn paginated(mut self, pagination: PaginationStyle) -> Self {
        self.pagination = pagination;
        self
    }

    /// Fill `{campaign_id}` and `{task_id}`. A placeholder without a
    /// non-blank value fails with `MissingParameter`.
    pub fn render(
        &self,
        campaign_id: Option<&str>,
        task_id: Option<&str>,
    ) -> Result<RenderedPath, ResolveError> {
        let segments = self
            .path_template
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let Some(name) = segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                else {
                    return Ok(segment.to_string());
                };
                let value = match name {
                    "campaign_id" => campaign_id,
                    "task_id" => task_id,
                    _ => None,
                };
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ResolveError::MissingParameter {
                        placeholder: name.to_string(),
                        endpoint: self.path_template.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RenderedPath { segments })
    }
}

/// Operation → ordered candidates. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    entries: Vec<(LogicalOperation, Vec<EndpointCandidate>)>,
}

const LIST_TASKS: &[EndpointCandidate] = &[
    EndpointCandidate::new(
        HttpMethod::Get,
        "basic-campaigns/{campaign_id}/slots",
        ExpectedShape::Collection,
    )
    .paginated(PaginationStyle::Cursor),
    EndpointCandidate::new(
        HttpMethod::Get,
        "basic-campaigns/{campaign_id}/tasks",
        ExpectedShape::Collection,
    )
    .paginated(PaginationStyle::Offset),
    EndpointCandidate::new(
        HttpMethod::Get,
        "hire-group-campaigns/{campaign_id}/slots",
        ExpectedShape::Collection,
    )
    .paginated(PaginationStyle::Cursor),
];

const GET_TASK_DETAIL: &[EndpointCandidate] = &[
    EndpointCandidate::new(HttpMethod::Get, "slots/{task_id}", ExpectedShape::Record),
    EndpointCandidate::new(
        HttpMethod::Get,
        "basic-campaigns/{campaign_id}/slots/{task_id}",
        ExpectedShape::Record,
    ),
    EndpointCandidate::new(
        HttpMethod::Get,
        "basic-campaigns/{campaign_id}/tasks/{task_id}",
        ExpectedShape::Record,
    ),
    EndpointCandidate::new(
        HttpMethod::Get,
        "hire-group-campaigns/{campaign_id}/slots/{task_id}",
        ExpectedShape::Record,
    ),
];

const RATE_TASK: &[EndpointCandidate] = &[
    EndpointCandidate::new(
        HttpMethod::Put,
        "slots/{task_id}/rate",
        ExpectedShape::Acknowledgement,
    ),
    EndpointCandidate::new(
        HttpMethod::Put,
        "basic-campaigns/{campaign_id}/slots/{task_id}/rate",
        ExpectedShape::Acknowledgement,
    ),
    EndpointCandidate::new(
        HttpMethod::Put,
        "basic-campaigns/{campaign_id}/tasks/{task_id}/rate",
        ExpectedShape::Acknowledgement,
    ),
    EndpointCandidate::new(
        HttpMethod::Put,
        "hire-group-campaigns/{campaign_id}/slots/{task_id}/rate",
        ExpectedShape::Acknowledgement,
    ),
];

const fn campaign_action(basic: &'static str, hire_group: &'static str) -> [EndpointCandidate; 2] {
    [
        EndpointCandidate::new(HttpMethod::Put, basic, ExpectedShape::Acknowledgement),
        EndpointCandidate::new(HttpMethod::Put, hire_group, ExpectedShape::Acknowledgement),
    ]
}

const PAUSE_CAMPAIGN: [EndpointCandidate; 2] = campaign_action(
    "basic-campaigns/{campaign_id}/pause",
    "hire-group-campaigns/{campaign_id}/pause",
);
const RESUME_CAMPAIGN: [EndpointCandidate; 2] = campaign_action(
    "basic-campaigns/{campaign_id}/resume",
    "hire-group-campaigns/{campaign_id}/resume",
);
const STOP_CAMPAIGN: [EndpointCandidate; 2] = campaign_action(
    "basic-campaigns/{campaign_id}/stop",
    "hire-group-campaigns/{campaign_id}/stop",
);
const RESTART_CAMPAIGN: [EndpointCandidate; 2] = campaign_action(
    "basic-campaigns/{campaign_id}/restart",
    "hire-group-campaigns/{campaign_id}/restart",
);
const UPDATE_CAMPAIGN: [EndpointCandidate; 2] = campaign_action(
    "basic-campaigns/{campaign_id}",
    "hire-group-campaigns/{campaign_id}",
);

impl CandidateTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The marketplace's known endpoint variants, most reliable first.
    pub fn standard() -> Self {
        Self::empty()
            .register(LogicalOperation::ListTasks, LIST_TASKS.to_vec())
            .register(LogicalOperation::GetTaskDetail, GET_TASK_DETAIL.to_vec())
            .register(LogicalOperation::RateTask, RATE_TASK.to_vec())
            .register(LogicalOperation::PauseCampaign, PAUSE_CAMPAIGN.to_vec())
            .register(LogicalOperation::ResumeCampaign, RESUME_CAMPAIGN.to_vec())
            .register(LogicalOperation::StopCampaign, STOP_CAMPAIGN.to_vec())
            .register(LogicalOperation::RestartCampaign, RESTART_CAMPAIGN.to_vec())
            .register(LogicalOperation::UpdateCampaign, UPDATE_CAMPAIGN.to_vec())
    }

    /// Register (or replace) the candidates of one operation.
    pub fn register(mut self, operation: LogicalOperation, candidates: Vec<EndpointCandidate>) -> Self {
        self.entries.retain(|(op, _)| *op != operation);
        self.entries.push((operation, candidates));
        self
    }

    pub fn candidates(&self, operation: LogicalOperation) -> Result<&[EndpointCandidate], ResolveError> {
        self.entries
            .iter()
            .find(|(op, candidates)| *op == operation && !candidates.is_empty())
            .map(|(_, candidates)| candidates.as_slice())
            .ok_or_else(|| ResolveError::UnknownOperation(operation.to_string()))
    }
}
