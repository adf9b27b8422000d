//! Toggle switch — a two-state button with a state output.

use serde::Serialize;

use devrack_app::gateway::GatewayServer;
use devrack_app::ports::StatePublisher;
use devrack_app::signal::OutputPort;
use devrack_domain::id::DeviceId;
use devrack_domain::state::StateFrame;

/// Result of the `toggle` action.
#[derive(Debug, Serialize)]
pub struct ToggleAck {
    pub success: bool,
    pub state: bool,
    pub message: String,
}

/// Requests served by the switch's run loop.
#[derive(Debug)]
pub enum ToggleAction {
    /// Flip the switch.
    Toggle,
    /// Read the current position.
    GetState,
}

/// Replies to [`ToggleAction`] requests.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ToggleReply {
    Ack(ToggleAck),
    State(serde_json::Value),
}

/// A simulated on/off switch.
pub struct ToggleSwitch<P> {
    device_id: DeviceId,
    publisher: P,
    state_out: OutputPort<bool>,
    is_on: bool,
}

impl<P: StatePublisher + Send + Sync> ToggleSwitch<P> {
    /// Create a switch that starts off.
    pub fn new(publisher: P, state_out: OutputPort<bool>) -> Self {
        Self {
            device_id: DeviceId::new(),
            publisher,
            state_out,
            is_on: false,
        }
    }

    /// Current switch position.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Textual state for the live view.
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_on { "on" } else { "off" }
    }

    /// Flip the switch, pushing the new state to the output.
    pub async fn toggle(&mut self) {
        self.is_on = !self.is_on;
        self.state_out.push(self.is_on).await;
        self.publish_state().await;
        tracing::info!(state = self.label(), "switch toggled");
    }

    /// `toggle` action: flip and acknowledge.
    pub async fn action_toggle(&mut self) -> ToggleAck {
        self.toggle().await;
        ToggleAck {
            success: true,
            state: self.is_on,
            message: self.label().to_string(),
        }
    }

    /// `get_state` action: report the current position.
    #[must_use]
    pub fn action_get_state(&self) -> serde_json::Value {
        serde_json::json!({
            "isOn": self.is_on,
            "label": self.label(),
        })
    }

    /// Serve action requests until every client is gone.
    pub async fn run(mut self, mut actions: GatewayServer<ToggleAction, ToggleReply>) {
        self.publish_state().await;
        while let Some((action, responder)) = actions.recv().await {
            let reply = match action {
                ToggleAction::Toggle => ToggleReply::Ack(self.action_toggle().await),
                ToggleAction::GetState => ToggleReply::State(self.action_get_state()),
            };
            responder.send(reply);
        }
    }

    async fn publish_state(&self) {
        let frame = StateFrame::new(self.device_id, "toggle", self.action_get_state());
        self.publisher.publish(frame).await;
    }
}
