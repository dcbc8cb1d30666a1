use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::candidate::ExpectedShape;
use crate::status;

/// Envelope fields that may carry the item list, in priority order.
pub const COLLECTION_ALIASES: [&str; 3] = ["slots", "items", "tasks"];

/// The one shape every consumer sees, whichever candidate answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub items: Vec<Value>,
    pub total: u64,
    /// Rendered path of the candidate that answered; empty for a degraded read.
    pub source_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl NormalizedResult {
    /// "No data" result returned when a read exhausts its candidates.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            source_endpoint: String::new(),
            next_page_token: None,
        }
    }
}

/// Parse a 2xx body according to `shape`. `Err` carries the reason the body
/// did not match.
pub fn normalize(shape: ExpectedShape, body: &str, source_endpoint: &str) -> Result<NormalizedResult, String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return match shape {
            ExpectedShape::Acknowledgement => Ok(build(Vec::new(), None, None, source_endpoint)),
            _ => Err("empty body".to_string()),
        };
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| format!("body is not JSON: {e}"))?;

    match shape {
        ExpectedShape::Collection => normalize_collection(value, source_endpoint),
        ExpectedShape::Record => match value {
            Value::Object(_) => Ok(build(vec![annotate(value)], Some(1), None, source_endpoint)),
            other => Err(format!("expected a JSON object, got {}", kind_of(&other))),
        },
        ExpectedShape::Acknowledgement => {
            let items = if value.is_null() { Vec::new() } else { vec![value] };
            Ok(build(items, None, None, source_endpoint))
        }
    }
}

fn normalize_collection(value: Value, source_endpoint: &str) -> Result<NormalizedResult, String> {
    let map = match value {
        Value::Array(items) => {
            return Ok(build(
                items.into_iter().map(annotate).collect(),
                None,
                None,
                source_endpoint,
            ));
        }
        Value::Object(map) => map,
        other => return Err(format!("expected a list envelope, got {}", kind_of(&other))),
    };

    let arrays: Vec<&Vec<Value>> = COLLECTION_ALIASES
        .iter()
        .filter_map(|alias| map.get(*alias).and_then(Value::as_array))
        .collect();
    let items = arrays
        .iter()
        .find(|items| !items.is_empty())
        .or_else(|| arrays.first())
        .ok_or_else(|| {
            format!(
                "no item list among {}",
                COLLECTION_ALIASES.join(", ")
            )
        })?;

    let total = ["total", "count"]
        .iter()
        .find_map(|key| map.get(*key).and_then(as_count));
    let next_page_token = ["nextPageToken", "next_page_token"]
        .iter()
        .find_map(|key| map.get(*key).and_then(as_token));

    Ok(build(
        items.iter().cloned().map(annotate).collect(),
        total,
        next_page_token,
        source_endpoint,
    ))
}

fn build(items: Vec<Value>, total: Option<u64>, next_page_token: Option<String>, source_endpoint: &str) -> NormalizedResult {
    NormalizedResult {
        total: total.unwrap_or(items.len() as u64),
        items,
        source_endpoint: source_endpoint.to_string(),
        next_page_token,
    }
}

/// Add `clientStatus` next to an upstream `status` the dashboard understands.
fn annotate(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        let client = map
            .get("status")
            .and_then(Value::as_str)
            .and_then(status::from_upstream);
        if let Some(client) = client {
            map.insert("clientStatus".to_string(), Value::String(client.to_string()));
        }
    }
    item
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
