//! State broadcast port — publish live-state snapshots to observers.

use std::future::Future;

use devrack_domain::state::StateFrame;

/// Publishes device state frames to interested observers.
///
/// Publishing is fire-and-forget: a frame published with no observers is
/// simply dropped, never an error.
pub trait StatePublisher {
    /// Publish a frame to all current observers.
    fn publish(&self, frame: StateFrame) -> impl Future<Output = ()> + Send;
}

impl<T: StatePublisher + Send + Sync> StatePublisher for std::sync::Arc<T> {
    fn publish(&self, frame: StateFrame) -> impl Future<Output = ()> + Send {
        (**self).publish(frame)
    }
}
