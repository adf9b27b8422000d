//! Handler failure type surfaced as HTTP 500.

use devrack_app::gateway::GatewayError;

/// A failure raised by a handler body.
///
/// The dispatcher converts any of these into a 500 response whose `message`
/// field carries the failure's description; the failure never propagates
/// further.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A gateway call failed (collaborator unavailable, dropped, timed out).
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The handler's result could not be serialized to JSON.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Any other handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Build a generic failure from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
