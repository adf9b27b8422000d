//! Handler registry — explicit identifier → handler mapping.
//!
//! Handlers are registered once at startup and the registry is read-only
//! afterwards. Because distinct paths can resolve to the same identifier,
//! registering the same identifier twice is rejected instead of silently
//! overwriting.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use devrack_domain::request::RequestDescriptor;

use crate::error::HandlerError;

/// What a handler produces: a JSON-serializable value or a failure.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Boxed future returned by a registered handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

type BoxedHandler = Box<dyn Fn(RequestDescriptor) -> HandlerFuture + Send + Sync>;

/// Rejected handler registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A handler is already registered under this identifier.
    #[error("handler already registered for `{0}`")]
    Duplicate(String),
}

/// Mapping from handler identifiers to async handler functions.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, BoxedHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the identifier is already
    /// taken — ambiguous registrations are rejected at startup rather than
    /// resolved by overwrite order.
    pub fn register<F, Fut>(
        &mut self,
        identifier: impl Into<String>,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(RequestDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let identifier = identifier.into();
        match self.handlers.entry(identifier) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                Err(RegistryError::Duplicate(entry.key().clone()))
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Box::new(move |descriptor| Box::pin(handler(descriptor))));
                Ok(())
            }
        }
    }

    /// Look up the handler for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&BoxedHandler> {
        self.handlers.get(identifier)
    }

    /// Whether a handler is registered under `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.handlers.contains_key(identifier)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
