//! Output ports — fire-and-forget device outputs.
//!
//! A device pushes values to its outputs without caring whether anything is
//! wired to them: pushing to a disconnected port is a no-op. This is the
//! deliberate opposite of the [`gateway`](crate::gateway) contract, where an
//! absent collaborator is an error.

use tokio::sync::mpsc;

/// A device output that may or may not be wired to a consumer.
pub struct OutputPort<T> {
    tx: Option<mpsc::Sender<T>>,
}

impl<T> OutputPort<T> {
    /// An output wired to the given channel.
    #[must_use]
    pub fn wired(tx: mpsc::Sender<T>) -> Self {
        Self { tx: Some(tx) }
    }

    /// An output with nothing attached.
    #[must_use]
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    /// Whether a consumer is attached.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.tx.is_some()
    }

    /// Push a value to the attached consumer, if any.
    ///
    /// Silently drops the value when the port is disconnected or the
    /// consumer has gone away.
    pub async fn push(&self, value: T) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(value).await;
        }
    }
}

impl<T> Default for OutputPort<T> {
    fn default() -> Self {
        Self::disconnected()
    }
}
