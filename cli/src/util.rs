use serde_json::json;
use url::Url;

/// Header the proxy reads a per-request marketplace key from.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Where and how to reach the proxy.
pub struct ProxyTarget {
    pub base_url: String,
    pub api_key: Option<String>,
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", pretty(&err));
    std::process::exit(4);
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Proxy URL for `path` with `query` appended. Empty values are skipped.
pub fn build_url(base_url: &str, path: &str, query: &[(&str, String)]) -> Result<Url, String> {
    let joined = format!("{}{path}", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&joined).map_err(|e| format!("Invalid URL: {joined}: {e}"))?;
    let pairs: Vec<_> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
    if !pairs.is_empty() {
        let mut q = url.query_pairs_mut();
        for (k, v) in pairs {
            q.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Percent-encode one path segment (task ids may contain reserved characters).
pub fn segment(raw: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return raw.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Exit code for an HTTP status: 0=2xx, 1=4xx, 2=everything else.
pub fn exit_code_for(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Execute a proxy request, print the response, and return a structured exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    target: &ProxyTarget,
    method: reqwest::Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<serde_json::Value>,
) -> i32 {
    let url = match build_url(&target.base_url, path, query) {
        Ok(url) => url,
        Err(message) => {
            eprintln!("{}", pretty(&json!({"error": "cli_error", "message": message})));
            return 4;
        }
    };
    tracing::debug!(%method, %url, "sending proxy request");

    let mut req = client().request(method, url);
    if let Some(key) = target.api_key.as_deref() {
        req = req.header(API_KEY_HEADER, key);
    }
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the proxy running? Check --proxy-url or CROWDGATE_PROXY_URL."
            });
            eprintln!("{}", pretty(&err));
            return 3;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for(status);

    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    if exit_code == 0 {
        println!("{}", pretty(&resp_body));
    } else {
        eprintln!("{}", pretty(&resp_body));
    }

    exit_code
}

/// Read a JSON value from a file path, or stdin when the path is `-`.
pub fn read_json_from_file(path: &str) -> Result<serde_json::Value, String> {
    let raw = if path == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|e| format!("Failed to read stdin: {e}"))?
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))?
    };
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_path_and_skips_empty_query_values() {
        let url = build_url(
            "http://localhost:3001/",
            "/tasks",
            &[("campaignId", "c1".to_string()), ("status", String::new())],
        )
        .expect("valid url");
        assert_eq!(url.as_str(), "http://localhost:3001/tasks?campaignId=c1");
    }

    #[test]
    fn build_url_rejects_garbage_base() {
        assert!(build_url("not a url", "/health", &[]).is_err());
    }

    #[test]
    fn segment_encodes_reserved_characters() {
        assert_eq!(segment("camp1_B_abcd_slot9"), "camp1_B_abcd_slot9");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn exit_codes_follow_status_class() {
        assert_eq!(exit_code_for(200), 0);
        assert_eq!(exit_code_for(422), 1);
        assert_eq!(exit_code_for(504), 2);
    }

    #[test]
    fn read_json_from_file_reports_missing_file() {
        let err = read_json_from_file("/definitely/not/here.json").expect_err("missing file");
        assert!(err.contains("Failed to read file"));
    }
}
