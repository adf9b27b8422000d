//! In-process state bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use devrack_domain::state::StateFrame;

use crate::ports::StatePublisher;

/// In-process state broadcast using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active observers
/// (the frame is simply dropped).
pub struct InProcessStateBus {
    sender: broadcast::Sender<StateFrame>,
}

impl InProcessStateBus {
    /// Create a new state bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to state frames on this bus.
    ///
    /// Returns a receiver that will get all frames published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateFrame> {
        self.sender.subscribe()
    }
}

impl StatePublisher for InProcessStateBus {
    fn publish(&self, frame: StateFrame) -> impl Future<Output = ()> + Send {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(frame);
        async {}
    }
}
