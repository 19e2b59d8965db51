//! Routes bus messages to the handlers registered for their exchange.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::BrokerMessage;

/// Reacts to messages from one exchange.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &BrokerMessage);
}

/// Logs every message at INFO. Registered for each configured exchange by
/// default.
pub struct LoggingHandler;

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, message: &BrokerMessage) {
        tracing::info!(
            exchange = %message.exchange,
            routing_key = %message.routing_key,
            body = %message.body,
            "Received broker message",
        );
    }
}

/// Exchange name to handler table.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: HashMap<String, Vec<Arc<dyn MessageHandler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for messages from `exchange`.
    pub fn register(&mut self, exchange: impl Into<String>, handler: Arc<dyn MessageHandler>) {
        self.handlers.entry(exchange.into()).or_default().push(handler);
    }

    /// Run every handler registered for the message's exchange.
    pub async fn dispatch(&self, message: &BrokerMessage) {
        match self.handlers.get(&message.exchange) {
            Some(handlers) => {
                for handler in handlers {
                    handler.handle(message).await;
                }
            }
            None => {
                tracing::debug!(exchange = %message.exchange, "No handler for exchange");
            }
        }
    }

    /// Consume the bus until it closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<BrokerMessage>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = receiver.recv() => received,
            };
            match received {
                Ok(message) => self.dispatch(&message).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Broker dispatcher lagged, some messages were dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Message bus closed, dispatcher shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::bus::MessageBus;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageHandler for Recorder {
        async fn handle(&self, message: &BrokerMessage) {
            self.seen.lock().await.push(message.body.clone());
        }
    }

    fn message(exchange: &str, body: &str) -> BrokerMessage {
        BrokerMessage {
            exchange: exchange.into(),
            routing_key: "k".into(),
            body: body.into(),
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn dispatch_routes_by_exchange() {
        let users = Arc::new(Recorder::default());
        let banana = Arc::new(Recorder::default());
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("users", users.clone());
        dispatcher.register("banana", banana.clone());

        dispatcher.dispatch(&message("users", "u1")).await;
        dispatcher.dispatch(&message("banana", "b1")).await;
        dispatcher.dispatch(&message("other", "o1")).await;

        assert_eq!(*users.seen.lock().await, vec!["u1"]);
        assert_eq!(*banana.seen.lock().await, vec!["b1"]);
    }

    #[tokio::test]
    async fn run_stops_when_bus_is_dropped() {
        let recorder = Arc::new(Recorder::default());
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("users", recorder.clone());

        let bus = MessageBus::default();
        let rx = bus.subscribe();
        bus.publish(message("users", "first"));
        drop(bus);

        dispatcher.run(rx, CancellationToken::new()).await;
        assert_eq!(*recorder.seen.lock().await, vec!["first"]);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let bus = MessageBus::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        Dispatcher::new().run(bus.subscribe(), cancel).await;
    }
}
