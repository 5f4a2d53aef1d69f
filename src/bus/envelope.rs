use crate::model::capability::Platform;
use crate::model::event::CorrelatedEvent;
use serde::{Deserialize, Serialize};

/// General telemetry channel. Per-platform streams additionally publish
/// to `telemetry:<platform>`.
pub const CHANNEL_EVENTS_CORRELATED: &str = "events:correlated";
/// High-priority security events.
pub const CHANNEL_ALERTS_SECURITY: &str = "alerts:security";
/// Destructive-tool invocation notices.
pub const CHANNEL_APPROVAL_REQUEST: &str = "approval:request";

/// Per-platform telemetry channel name, e.g. `telemetry:meraki`.
pub fn telemetry_channel(platform: &Platform) -> String {
    format!("telemetry:{}", platform.as_str())
}

/// Envelope published when a destructive or approval-required capability
/// is invoked. See `spec` §4.13.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequestEnvelope {
    pub approval_id: String,
    pub tool_name: String,
    pub caller_identity: Option<String>,
    pub platform: Platform,
    pub parameters_hash: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A decoded bus message: the channel it arrived on plus the JSON payload.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub channel: String,
    pub payload: serde_json::Value,
}

impl BusMessage {
    pub fn event(channel: impl Into<String>, event: &CorrelatedEvent) -> anyhow::Result<Self> {
        Ok(Self {
            channel: channel.into(),
            payload: serde_json::to_value(event)?,
        })
    }

    pub fn decode_event(&self) -> Option<CorrelatedEvent> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_channel_names_follow_convention() {
        assert_eq!(telemetry_channel(&Platform::Meraki), "telemetry:meraki");
        assert_eq!(
            telemetry_channel(&Platform::Other("acme".into())),
            "telemetry:acme"
        );
    }
}
