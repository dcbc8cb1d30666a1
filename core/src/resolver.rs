//! Endpoint resolution: turn a logical operation into ordered upstream
//! attempts and stop at the first one that answers in the expected shape.
//!
//! Attempts are strictly sequential. An earlier success must short-circuit
//! later candidates, and the upstream rate-limits speculative traffic.

use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::candidate::{CandidateTable, EndpointCandidate, HttpMethod, Pagination};
use crate::config::UpstreamConfig;
use crate::error::{DetailRank, ResolveError, upstream_error_detail};
use crate::identifier::{CompositeTaskId, task_id_forms};
use crate::normalize::{NormalizedResult, normalize};
use crate::operation::LogicalOperation;
use crate::status;
use crate::transport::{UpstreamRequest, UpstreamResponse, UpstreamTransport};

/// Caller-side inputs of one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveParams {
    pub campaign_id: Option<String>,
    pub task_id: Option<String>,
    /// Status filter in the dashboard's vocabulary.
    pub status_filter: Option<String>,
    pub pagination: Option<Pagination>,
    /// Request body for mutating operations, forwarded as-is.
    pub body: Option<serde_json::Value>,
    /// Per-request key; overrides the configured default.
    pub api_key: Option<String>,
}

impl ResolveParams {
    pub fn for_campaign(campaign_id: impl Into<String>) -> Self {
        Self {
            campaign_id: Some(campaign_id.into()),
            ..Self::default()
        }
    }

    pub fn for_task(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            ..Self::default()
        }
    }

    pub fn campaign(mut self, campaign_id: Option<String>) -> Self {
        self.campaign_id = campaign_id;
        self
    }

    pub fn status(mut self, status_filter: Option<String>) -> Self {
        self.status_filter = status_filter;
        self
    }

    pub fn page(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// One candidate that did not produce the result.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Rendered path, or the template when it could not be rendered.
    pub endpoint: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(serialize_with = "serialize_display")]
    #[schema(value_type = String)]
    pub error: ResolveError,
    #[serde(skip)]
    rank: DetailRank,
}

impl AttemptRecord {
    /// Whether a request actually went out for this attempt.
    pub fn was_sent(&self) -> bool {
        !matches!(self.error, ResolveError::MissingParameter { .. })
    }
}

fn serialize_display<S: Serializer>(error: &ResolveError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Which candidate produced a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMatch {
    /// Position in the operation's candidate list.
    pub index: usize,
    pub endpoint: String,
    pub method: HttpMethod,
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// `matched` is `None` when a read degraded to an empty result.
    /// `attempts` holds the candidates that failed before the result.
    Success {
        result: NormalizedResult,
        matched: Option<CandidateMatch>,
        attempts: Vec<AttemptRecord>,
    },
    Failure {
        error: ResolveError,
        attempts: Vec<AttemptRecord>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub result: NormalizedResult,
    pub matched: Option<CandidateMatch>,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct ResolutionFailure {
    pub error: ResolveError,
    pub attempts: Vec<AttemptRecord>,
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn into_result(self) -> Result<Resolved, ResolutionFailure> {
        match self {
            Self::Success {
                result,
                matched,
                attempts,
            } => Ok(Resolved {
                result,
                matched,
                attempts,
            }),
            Self::Failure { error, attempts } => Err(ResolutionFailure { error, attempts }),
        }
    }
}

pub struct Resolver<T> {
    config: UpstreamConfig,
    table: CandidateTable,
    transport: T,
}

impl<T: UpstreamTransport> Resolver<T> {
    pub fn new(config: UpstreamConfig, transport: T) -> Self {
        Self {
            config,
            table: CandidateTable::standard(),
            transport,
        }
    }

    pub fn with_table(mut self, table: CandidateTable) -> Self {
        self.table = table;
        self
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub async fn resolve(&self, operation: LogicalOperation, params: &ResolveParams) -> ResolutionOutcome {
        let candidates = match self.table.candidates(operation) {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(operation = %operation, "no candidates registered");
                return ResolutionOutcome::Failure {
                    error,
                    attempts: Vec::new(),
                };
            }
        };

        let task_id = params.task_id.as_deref();
        let task_forms: Vec<Option<&str>> = match task_id {
            Some(raw) if operation.expands_task_identifiers() => {
                task_id_forms(raw).into_iter().map(Some).collect()
            }
            other => vec![other],
        };
        let campaign_id = params
            .campaign_id
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| task_id.and_then(CompositeTaskId::parse).map(|c| c.campaign_id));
        let status_filter = params
            .status_filter
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(status::to_upstream);
        let api_key = self.config.effective_api_key(params.api_key.as_deref());

        let mut attempts = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            for task_form in &task_forms {
                let path = match candidate.render(campaign_id, *task_form) {
                    Ok(path) => path,
                    Err(error) => {
                        tracing::debug!(
                            operation = %operation,
                            endpoint = candidate.path_template,
                            error = %error,
                            "candidate skipped"
                        );
                        attempts.push(record(candidate, candidate.path_template.to_string(), *task_form, error, DetailRank::Raw));
                        continue;
                    }
                };
                let endpoint = path.to_string();

                let mut query = Vec::new();
                if let Some(status) = status_filter {
                    query.push(("status".to_string(), status.to_string()));
                }
                query.extend(candidate.pagination.query(params.pagination.as_ref()));

                let mut url = self.config.endpoint_url(&path);
                if !query.is_empty() {
                    url.query_pairs_mut().extend_pairs(query);
                }

                let request = UpstreamRequest {
                    method: candidate.method,
                    url,
                    body: candidate
                        .method
                        .sends_body()
                        .then(|| params.body.clone())
                        .flatten(),
                    api_key: api_key.clone(),
                };

                let classified = match self.transport.send(request).await {
                    Ok(response) => classify(candidate, &endpoint, response),
                    Err(err) => Err((
                        ResolveError::UpstreamUnreachable {
                            endpoint: endpoint.clone(),
                            message: err.to_string(),
                        },
                        DetailRank::Raw,
                    )),
                };

                match classified {
                    Ok(result) => {
                        tracing::info!(
                            operation = %operation,
                            endpoint = %endpoint,
                            candidate = index,
                            failed_attempts = attempts.len(),
                            "candidate matched"
                        );
                        return ResolutionOutcome::Success {
                            result,
                            matched: Some(CandidateMatch {
                                index,
                                endpoint,
                                method: candidate.method,
                                task_id: task_form.map(str::to_string),
                            }),
                            attempts,
                        };
                    }
                    Err((error, rank)) => {
                        if error.is_not_applicable() {
                            tracing::debug!(
                                operation = %operation,
                                endpoint = %endpoint,
                                status = ?error.upstream_status(),
                                "candidate does not apply"
                            );
                        } else {
                            tracing::warn!(
                                operation = %operation,
                                endpoint = %endpoint,
                                error = %error,
                                "candidate failed"
                            );
                        }
                        attempts.push(record(candidate, endpoint, *task_form, error, rank));
                    }
                }
            }
        }

        let last_sent = attempts.iter().rev().find(|a| a.was_sent());
        if operation.is_read() && last_sent.is_some_and(|a| a.error.degrades_to_empty()) {
            tracing::info!(
                operation = %operation,
                attempts = attempts.len(),
                "all candidates exhausted, returning empty result"
            );
            return ResolutionOutcome::Success {
                result: NormalizedResult::empty(),
                matched: None,
                attempts,
            };
        }

        let error = most_specific_error(&attempts)
            .unwrap_or_else(|| ResolveError::UnknownOperation(operation.to_string()));
        tracing::warn!(
            operation = %operation,
            attempts = attempts.len(),
            error = %error,
            "all candidates exhausted"
        );
        ResolutionOutcome::Failure { error, attempts }
    }
}

fn classify(
    candidate: &EndpointCandidate,
    endpoint: &str,
    response: UpstreamResponse,
) -> Result<NormalizedResult, (ResolveError, DetailRank)> {
    if response.is_success() {
        return normalize(candidate.shape, &response.body, endpoint).map_err(|reason| {
            (
                ResolveError::InvalidUpstreamResponse {
                    endpoint: endpoint.to_string(),
                    reason,
                },
                DetailRank::Raw,
            )
        });
    }

    let (rank, message) = upstream_error_detail(response.status, &response.body);
    Err((
        ResolveError::UpstreamRejected {
            endpoint: endpoint.to_string(),
            status: response.status,
            message,
        },
        rank,
    ))
}

fn record(
    candidate: &EndpointCandidate,
    endpoint: String,
    task_id: Option<&str>,
    error: ResolveError,
    rank: DetailRank,
) -> AttemptRecord {
    AttemptRecord {
        endpoint,
        method: candidate.method,
        task_id: task_id.map(str::to_string),
        status: error.upstream_status(),
        error,
        rank,
    }
}

/// Best error among sent attempts. A 404 only means the path did not apply, so
/// any other answer beats it; then the most specific text wins, earliest
/// attempt on ties. Falls back to the first unsent attempt when nothing went out.
fn most_specific_error(attempts: &[AttemptRecord]) -> Option<ResolveError> {
    attempts
        .iter()
        .filter(|a| a.was_sent())
        .min_by_key(|a| (a.status == Some(404), a.rank))
        .or_else(|| attempts.first())
        .map(|a| a.error.clone())
}
