//! Gateway channel — a request/reply bridge between components.
//!
//! An HTTP handler sometimes has to answer with state owned by a different
//! component (the memory monitor answers `GET /memory`). The gateway models
//! that as a pair of halves created together by [`reply_channel`]:
//!
//! - [`GatewayClient::call`] sends a payload and suspends the calling task
//!   until the correlated reply arrives. Each call carries its own oneshot
//!   reply slot, so no multiplexed correlation ids are needed.
//! - [`GatewayServer::recv`] yields `(request, responder)` pairs on the
//!   collaborator side.
//!
//! Unlike the fire-and-forget [`OutputPort`](crate::signal::OutputPort), the
//! gateway has a strict contract: calling with no connected collaborator
//! fails immediately with [`GatewayError::Unavailable`], and the whole
//! exchange (queueing the request and waiting for the reply) is bounded by a
//! timeout — a caller is never left suspended forever.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

/// Failure modes of a gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The collaborator side of the channel is gone (or never started).
    #[error("no collaborator connected")]
    Unavailable,
    /// The collaborator received the request but dropped the responder
    /// without replying.
    #[error("collaborator dropped the request")]
    Dropped,
    /// No reply arrived within the configured timeout.
    #[error("no reply within {0:?}")]
    TimedOut(Duration),
}

/// Calling half of a gateway channel.
pub struct GatewayClient<Req, Res> {
    tx: mpsc::Sender<(Req, Responder<Res>)>,
    timeout: Duration,
}

// Manual Clone: Req/Res need not be Clone themselves.
impl<Req, Res> Clone for GatewayClient<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            timeout: self.timeout,
        }
    }
}

impl<Req, Res> GatewayClient<Req, Res> {
    /// Send `request` and suspend until the reply arrives.
    ///
    /// The timeout covers the whole exchange: queueing the request (which
    /// can block when the collaborator's queue is full) as well as waiting
    /// for the reply.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unavailable`] if the collaborator is not connected
    /// - [`GatewayError::Dropped`] if the collaborator discarded the request
    /// - [`GatewayError::TimedOut`] if the exchange did not complete within
    ///   the timeout
    pub async fn call(&self, request: Req) -> Result<Res, GatewayError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.tx
                .send((request, Responder(reply_tx)))
                .await
                .map_err(|_| GatewayError::Unavailable)?;
            reply_rx.await.map_err(|_| GatewayError::Dropped)
        };
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::TimedOut(self.timeout)),
        }
    }
}

/// Reply slot handed to the collaborator together with each request.
pub struct Responder<Res>(oneshot::Sender<Res>);

impl<Res> Responder<Res> {
    /// Send the reply. If the caller gave up in the meantime the reply is
    /// silently discarded.
    pub fn send(self, reply: Res) {
        let _ = self.0.send(reply);
    }
}

/// Serving half of a gateway channel.
pub struct GatewayServer<Req, Res> {
    rx: mpsc::Receiver<(Req, Responder<Res>)>,
}

impl<Req, Res> GatewayServer<Req, Res> {
    /// Receive the next request, or `None` when every client is gone.
    pub async fn recv(&mut self) -> Option<(Req, Responder<Res>)> {
        self.rx.recv().await
    }
}

/// Create a connected client/server pair.
///
/// `capacity` bounds the number of queued requests; `timeout` bounds how long
/// a caller waits for each reply.
#[must_use]
pub fn reply_channel<Req, Res>(
    capacity: usize,
    timeout: Duration,
) -> (GatewayClient<Req, Res>, GatewayServer<Req, Res>) {
    let (tx, rx) = mpsc::channel(capacity);
    (GatewayClient { tx, timeout }, GatewayServer { rx })
}
