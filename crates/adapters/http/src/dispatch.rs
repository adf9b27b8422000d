//! Request dispatcher — the single funnel every accepted request runs through.
//!
//! Per request the dispatcher bumps the `requests_served` counter, publishes
//! a state frame, resolves the handler identifier, invokes the handler (which
//! may itself await a gateway call), and formats exactly one response
//! envelope. Handler failures are swallowed here: the transport always sees a
//! completed response, never a propagated error.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use devrack_app::ports::StatePublisher;
use devrack_domain::id::DeviceId;
use devrack_domain::request::RequestDescriptor;
use devrack_domain::state::StateFrame;

use crate::error::HandlerError;
use crate::registry::HandlerRegistry;
use crate::resolve::resolve;

/// The status code and JSON body written back to the client.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status: StatusCode,
    /// JSON body (handler result or structured error).
    pub body: serde_json::Value,
}

impl ResponseEnvelope {
    fn ok(body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: serde_json::json!({
                "success": false,
                "error": "Endpoint not found",
            }),
        }
    }

    fn internal_error(err: &HandlerError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: serde_json::json!({
                "success": false,
                "error": "Internal server error",
                "message": err.to_string(),
            }),
        }
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        // serializing a serde_json::Value cannot fail; the fallback is never hit
        let body = serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| "{}".to_string());
        (
            self.status,
            [
                (header::CONTENT_TYPE, "application/json; charset=utf-8"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            ],
            body,
        )
            .into_response()
    }
}

/// Orchestrates request handling: counter, state broadcast, resolution,
/// invocation, response formatting.
pub struct Dispatcher<P> {
    registry: HandlerRegistry,
    publisher: P,
    device_id: DeviceId,
    requests_served: AtomicU64,
}

impl<P: StatePublisher + Send + Sync> Dispatcher<P> {
    /// Create a dispatcher over a fully-populated registry.
    pub fn new(registry: HandlerRegistry, publisher: P) -> Self {
        Self {
            registry,
            publisher,
            device_id: DeviceId::new(),
            requests_served: AtomicU64::new(0),
        }
    }

    /// Number of requests accepted so far.
    #[must_use]
    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    /// Publish the dispatcher's own state frame (the request counter).
    ///
    /// Called once at startup and once per accepted request.
    pub async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "http-server",
            serde_json::json!({"requests": self.requests_served()}),
        );
        self.publisher.publish(frame).await;
    }

    /// Handle one accepted request, producing exactly one envelope.
    ///
    /// The counter and broadcast happen before handler lookup, so the
    /// counter reflects requests *accepted*, not requests *completed*.
    pub async fn dispatch(&self, descriptor: RequestDescriptor) -> ResponseEnvelope {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.publish_state().await;

        let identifier = resolve(&descriptor.method, &descriptor.path);
        let Some(handler) = self.registry.get(&identifier) else {
            tracing::debug!(%identifier, path = %descriptor.path, "no handler registered");
            return ResponseEnvelope::not_found();
        };

        match handler(descriptor).await {
            Ok(value) => ResponseEnvelope::ok(value),
            Err(err) => {
                tracing::warn!(%identifier, error = %err, "handler failed");
                ResponseEnvelope::internal_error(&err)
            }
        }
    }
}
