pub mod adapter;
pub mod envelope;

pub use adapter::EventBus;
pub use envelope::{
    BusMessage, CHANNEL_ALERTS_SECURITY, CHANNEL_APPROVAL_REQUEST, CHANNEL_EVENTS_CORRELATED,
    telemetry_channel,
};
