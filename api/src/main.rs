use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use crowdgate_core::Resolver;

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;
mod upstream;

#[cfg(test)]
mod test_support;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crowdgate API",
        version = "0.1.0",
        description = "Proxy between the SEO dashboard and the crowd-work marketplace. Resolves each logical operation against the marketplace's fallback endpoints and returns one normalized shape."
    ),
    paths(
        routes::health::health_check,
        routes::tasks::list_tasks,
        routes::tasks::get_task,
        routes::tasks::rate_task,
        routes::campaigns::campaign_action,
        routes::campaigns::update_campaign,
    ),
    components(schemas(
        HealthResponse,
        routes::ProxyResponse,
        routes::tasks::TaskListResponse,
        routes::tasks::RateTaskRequest,
        crowdgate_core::error::ApiError,
        crowdgate_core::AttemptRecord,
        crowdgate_core::HttpMethod,
        crowdgate_core::NormalizedResult,
        crowdgate_core::Rating,
        crowdgate_core::StatusToken,
    )),
    modifiers(&ApiKeyAddon)
)]
struct ApiDoc;

struct ApiKeyAddon;

impl utoipa::Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            utoipa::openapi::security::SecurityScheme::ApiKey(
                utoipa::openapi::security::ApiKey::Header(
                    utoipa::openapi::security::ApiKeyValue::new(extract::API_KEY_HEADER),
                ),
            ),
        );
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Configured marketplace base URL
    pub upstream: String,
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Every route, without rate limiting or transport layers.
fn app_routes() -> Router<state::AppState> {
    Router::new()
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(routes::health::router())
        .merge(routes::tasks::read_router().layer(middleware::rate_limit::read_layer()))
        .merge(routes::tasks::write_router().layer(middleware::rate_limit::write_layer()))
        .merge(routes::campaigns::router().layer(middleware::rate_limit::write_layer()))
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crowdgate_api=debug,crowdgate_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let transport = match upstream::ReqwestTransport::new(config.upstream.timeout()) {
        Ok(transport) => transport,
        Err(err) => {
            tracing::error!(error = %err, "failed to build upstream HTTP client");
            std::process::exit(1);
        }
    };
    if !config.upstream.has_default_api_key() {
        tracing::warn!("CROWDGATE_API_KEY is not set; requests without x-api-key go upstream unauthenticated");
    }
    tracing::info!(
        upstream = %config.upstream.base_url(),
        timeout_secs = config.upstream.timeout().as_secs(),
        "upstream configured"
    );

    let app_state = state::AppState::new(Resolver::new(config.upstream.clone(), transport));
    let cors_layer = middleware::cors::build_cors_layer(&config.cors_origins);

    let app = app_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Crowdgate API listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %err, "server stopped");
        std::process::exit(1);
    }
}
