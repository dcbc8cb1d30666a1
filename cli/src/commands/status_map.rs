use serde_json::{Value, json};

use crowdgate_core::StatusToken;
use crowdgate_core::status::to_upstream;

/// Print how dashboard status tokens translate to the marketplace's vocabulary.
/// Runs offline.
pub fn run(token: Option<&str>) -> i32 {
    let output = match token {
        Some(token) => translate(token),
        None => table(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
    );
    0
}

fn translate(token: &str) -> Value {
    json!({
        "input": token,
        "upstream": to_upstream(token),
        "recognized": token.parse::<StatusToken>().is_ok(),
    })
}

fn table() -> Value {
    StatusToken::ALL
        .iter()
        .map(|token| (token.to_string(), json!(token.upstream().as_str())))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_token_is_translated() {
        let out = translate("needs_revision");
        assert_eq!(out["upstream"], "REVISE");
        assert_eq!(out["recognized"], true);
    }

    #[test]
    fn unknown_token_passes_through() {
        let out = translate("ARCHIVED");
        assert_eq!(out["upstream"], "ARCHIVED");
        assert_eq!(out["recognized"], false);
    }

    #[test]
    fn table_lists_every_caller_token() {
        let out = table();
        let map = out.as_object().expect("object");
        assert_eq!(map.len(), StatusToken::ALL.len());
        assert_eq!(map["DONE"], "OK");
        assert_eq!(map["SUBMITTED"], "NOTRATED");
    }
}
