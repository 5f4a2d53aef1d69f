use crate::bus::envelope::BusMessage;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Bounded backlog per channel; a slow subscriber falls behind and misses
/// the oldest messages rather than blocking publishers.
const CHANNEL_CAPACITY: usize = 256;

/// Typed pub/sub over named channels with JSON envelopes.
///
/// Recovers from a channel with no subscribers by logging and reporting
/// zero deliveries rather than raising — matching the at-least-once,
/// best-effort contract of the transport it abstracts.
pub struct EventBus {
    channels: Mutex<HashMap<String, broadcast::Sender<BusMessage>>>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<BusMessage> {
        let mut channels = self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish a payload on `channel`. Returns the number of active
    /// subscribers it was delivered to; 0 if the transport has no
    /// subscribers or is otherwise unavailable. Never raises.
    pub fn publish(&self, channel: &str, payload: serde_json::Value) -> usize {
        let sender = self.sender_for(channel);
        let message = BusMessage {
            channel: channel.to_string(),
            payload,
        };
        match sender.send(message) {
            Ok(count) => count,
            Err(_) => {
                debug!("bus: publish on '{}' had no subscribers", channel);
                0
            }
        }
    }

    /// Lazily establish a subscription and spawn a task that invokes
    /// `handler` for every message received on `channel`. Messages not
    /// matching this channel are never delivered here — each channel has
    /// its own broadcast ring. A handler error is caught and logged; it
    /// never cancels the listener.
    pub fn subscribe<F, Fut>(&self, channel: &str, mut handler: F)
    where
        F: FnMut(BusMessage) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        let mut receiver = self.sender_for(channel).subscribe();
        let channel_name = channel.to_string();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        if let Err(e) = handler(message).await {
                            warn!("bus: handler error on '{}': {}", channel_name, e);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            "bus: subscriber on '{}' lagged, skipped {} message(s)",
                            channel_name, skipped
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(handle);
    }

    /// Cancel every listener task. The bus can be reused afterward; new
    /// subscriptions re-establish fresh channels.
    pub fn close(&self) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for handle in listeners.drain(..) {
            handle.abort();
        }
        self.channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}
