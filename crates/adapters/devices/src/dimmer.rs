//! Dimmer — a brightness knob other devices can read from.
//!
//! Levels are clamped to 0–100 on the input paths; the action path rejects
//! out-of-range values instead of clamping.

use serde::Serialize;
use tokio::sync::mpsc;

use devrack_app::gateway::GatewayServer;
use devrack_app::ports::StatePublisher;
use devrack_app::signal::OutputPort;
use devrack_domain::error::ValidationError;
use devrack_domain::id::DeviceId;
use devrack_domain::state::StateFrame;
use devrack_domain::time::{Timestamp, now};

/// Requests served by the dimmer's run loop.
#[derive(Debug)]
pub enum DimmerAction {
    /// Validated absolute set.
    SetBrightness(i64),
    /// Read the current level.
    GetBrightness,
}

/// Replies to [`DimmerAction`] requests.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DimmerReply {
    Ack(BrightnessAck),
    Reading(BrightnessReading),
}

/// Result of the `set_brightness` action.
#[derive(Debug, Serialize)]
pub struct BrightnessAck {
    pub success: bool,
    pub brightness: i64,
    pub message: String,
}

/// Result of the `get_brightness` action.
#[derive(Debug, Serialize)]
pub struct BrightnessReading {
    pub brightness: i64,
    pub percentage: String,
    pub timestamp: Timestamp,
}

/// A simulated brightness regulator.
pub struct Dimmer<P> {
    device_id: DeviceId,
    publisher: P,
    level_out: OutputPort<i64>,
    level: i64,
}

impl<P: StatePublisher + Send + Sync> Dimmer<P> {
    /// Create a dimmer starting at `initial_level` (clamped to 0–100).
    pub fn new(publisher: P, level_out: OutputPort<i64>, initial_level: i64) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            level_out,
            level: initial_level.clamp(0, 100),
        }
    }

    /// Current brightness level.
    #[must_use]
    pub fn level(&self) -> i64 {
        self.level
    }

    /// Set an absolute level (clamped).
    pub async fn set_level(&mut self, level: i64) {
        self.apply(level).await;
    }

    /// Adjust the level relative to the current one (clamped).
    pub async fn adjust(&mut self, delta: i64) {
        self.apply(self.level + delta).await;
    }

    /// `set_brightness` action: like [`set_level`](Self::set_level) but the
    /// argument is validated instead of clamped.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `level` is outside 0–100.
    pub async fn action_set_brightness(
        &mut self,
        level: i64,
    ) -> Result<BrightnessAck, ValidationError> {
        if !(0..=100).contains(&level) {
            return Err(ValidationError::new(
                "level",
                "must be between 0 and 100",
            ));
        }
        self.apply(level).await;
        Ok(BrightnessAck {
            success: true,
            brightness: self.level,
            message: format!("brightness set to {}%", self.level),
        })
    }

    /// `get_brightness` action: report the current level.
    #[must_use]
    pub fn action_get_brightness(&self) -> BrightnessReading {
        BrightnessReading {
            brightness: self.level,
            percentage: format!("{}%", self.level),
            timestamp: now(),
        }
    }

    /// Consume input channels and serve action requests until all senders
    /// are gone.
    pub async fn run(
        mut self,
        mut set_level: mpsc::Receiver<i64>,
        mut adjust: mpsc::Receiver<i64>,
        mut actions: GatewayServer<DimmerAction, Result<DimmerReply, ValidationError>>,
    ) {
        self.publish_state().await;
        loop {
            tokio::select! {
                maybe = set_level.recv() => match maybe {
                    Some(level) => self.set_level(level).await,
                    None => break,
                },
                maybe = adjust.recv() => match maybe {
                    Some(delta) => self.adjust(delta).await,
                    None => break,
                },
                maybe = actions.recv() => match maybe {
                    Some((action, responder)) => {
                        responder.send(self.handle_action(action).await);
                    }
                    None => break,
                },
            }
        }
    }

    async fn handle_action(
        &mut self,
        action: DimmerAction,
    ) -> Result<DimmerReply, ValidationError> {
        match action {
            DimmerAction::SetBrightness(level) => self
                .action_set_brightness(level)
                .await
                .map(DimmerReply::Ack),
            DimmerAction::GetBrightness => Ok(DimmerReply::Reading(self.action_get_brightness())),
        }
    }

    async fn apply(&mut self, level: i64) {
        self.level = level.clamp(0, 100);
        self.level_out.push(self.level).await;
        self.publish_state().await;
        tracing::debug!(level = self.level, "brightness changed");
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(
            self.device_id,
            "dimmer",
            serde_json::json!({
                "brightness": self.level,
                "percentage": format!("{}%", self.level),
            }),
        );
        self.publisher.publish(frame).await;
    }
}
