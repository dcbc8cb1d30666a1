use crate::util::{ProxyTarget, api_request};

pub async fn run(target: &ProxyTarget) -> i32 {
    api_request(target, reqwest::Method::GET, "/health", &[], None).await
}
