use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// CORS for the dashboard origins.
///
/// - Methods: GET, PUT, OPTIONS
/// - Headers: Authorization, Content-Type, x-api-key
/// - Credentials: allowed
/// - Max age: 3600s
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            // A wildcard cannot be combined with credentials.
            Ok(_) if origin.trim() == "*" => {
                tracing::warn!("ignoring wildcard CORS origin; list dashboard origins explicitly");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "skipping unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static(crate::extract::API_KEY_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
