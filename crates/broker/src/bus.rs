//! In-process fan-out of broker deliveries backed by `tokio::sync::broadcast`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// A message delivered from one of the subscribed exchanges.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerMessage {
    pub exchange: String,
    pub routing_key: String,
    /// Payload decoded as UTF-8; invalid sequences are replaced.
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl BrokerMessage {
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>, body: &[u8]) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            body: String::from_utf8_lossy(body).into_owned(),
            received_at: Utc::now(),
        }
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Publish/subscribe hub for [`BrokerMessage`]s, shared via `Arc`.
pub struct MessageBus {
    sender: broadcast::Sender<BrokerMessage>,
}

impl MessageBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer fills.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if there are none.
    pub fn publish(&self, message: BrokerMessage) {
        let _ = self.sender.send(message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrokerMessage> {
        self.sender.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
