//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors (registry and handler errors in
//! the HTTP adapter, gateway errors in `app`, config errors in the binary).
//! The domain only carries validation failures, produced when a device
//! action receives an out-of-range argument.

/// A rejected action argument.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the constraint that failed.
    pub message: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
