//! State frame — a snapshot of a device's live-view data.
//!
//! Devices publish a frame after every state change (and once at startup) so
//! external observers always see current values. Frames are fire-and-forget:
//! publishing with no observers simply drops the frame.

use serde::Serialize;

use crate::id::DeviceId;
use crate::time::{Timestamp, now};

/// A published snapshot of one device's shared state.
#[derive(Debug, Clone, Serialize)]
pub struct StateFrame {
    /// Identifier of the publishing device instance.
    pub device: DeviceId,
    /// Stable human-readable source name (e.g. `"http-server"`, `"dimmer"`).
    pub source: &'static str,
    /// The device's shared values as a JSON object.
    pub shares: serde_json::Value,
    /// When the snapshot was taken.
    pub at: Timestamp,
}

impl StateFrame {
    /// Build a frame timestamped with the current time.
    #[must_use]
    pub fn new(device: DeviceId, source: &'static str, shares: serde_json::Value) -> Self {
        Self {
            device,
            source,
            shares,
            at: now(),
        }
    }
}
