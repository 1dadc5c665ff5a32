//! Payment webhook endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::adapters::http::error::ErrorResponse;
use crate::application::handlers::{HandlePaymentWebhookCommand, HandlePaymentWebhookHandler};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Clone)]
pub struct WebhookHandlers {
    pub payment_webhook: Arc<HandlePaymentWebhookHandler>,
}

/// POST /api/webhooks/payments
///
/// The body is passed through untouched since the signature covers the
/// exact bytes. Anything that verifies is acknowledged with 200, even when
/// applying it failed; only unverifiable deliveries get a 400.
pub async fn handle_payment_webhook(
    State(handlers): State<WebhookHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match handlers.payment_webhook.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "success" }))).into_response(),
        Err(err) if err.rejects_delivery() => (
            err.status_code(),
            Json(ErrorResponse::new("SIGNATURE_INVALID", err.to_string())),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Webhook handling failed after verification");
            (err.status_code(), Json(json!({ "status": "success" }))).into_response()
        }
    }
}

/// Creates the webhook router.
///
/// # Routes
/// - `POST /payments` - Payment gateway notifications
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/payments", post(handle_payment_webhook))
        .with_state(handlers)
}
