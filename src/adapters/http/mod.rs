//! HTTP adapters - REST API implementations.
//!
//! - `consulting` - outreach, researchers, sessions, subscription
//! - `webhooks` - payment gateway notifications
//! - `middleware` - actor extraction from identity headers

pub mod consulting;
pub mod error;
pub mod middleware;
pub mod webhooks;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;

pub use consulting::{consulting_routes, ConsultingHandlers};
pub use error::{ApiError, ErrorResponse};
pub use middleware::{OptionalActor, RequireActor};
pub use webhooks::{webhook_routes, WebhookHandlers};

/// Builds the complete router.
///
/// ```text
/// /health
/// /api/consulting/...
/// /api/webhooks/payments
/// ```
pub fn app_router(
    consulting: ConsultingHandlers,
    webhooks: WebhookHandlers,
    server: &ServerConfig,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/consulting", consulting_routes(consulting))
        .nest("/api/webhooks", webhook_routes(webhooks))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(middleware::USER_ID_HEADER),
            HeaderName::from_static(middleware::USER_ROLE_HEADER),
        ])
}
