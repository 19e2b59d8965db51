//! The seam between [`BrokerService`](crate::BrokerService) and the wire.
//!
//! A [`Transport`] opens a [`Session`] bound to a set of exchanges; the
//! session yields deliveries until the link drops. The service owns retry,
//! reconnection and fan-out, so a transport only has to speak its protocol.

use async_trait::async_trait;

use crate::bus::BrokerMessage;

/// Errors from opening or reading a broker session.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),

    /// The broker refused the connection or one of the declarations.
    #[error("Broker rejected the request: {0}")]
    Rejected(String),
}

/// Opens sessions against one broker.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Session: Session;

    /// Connect and start consuming from every exchange in `exchanges`,
    /// bound with the `#` routing pattern.
    async fn open(&self, exchanges: &[String]) -> Result<Self::Session, BrokerError>;

    /// Where this transport connects, for log lines. Must not leak
    /// credentials.
    fn endpoint(&self) -> String;
}

/// A live subscription.
#[async_trait]
pub trait Session: Send + 'static {
    /// Next delivery, already acknowledged. `Ok(None)` means the broker
    /// closed the subscription.
    async fn next_message(&mut self) -> Result<Option<BrokerMessage>, BrokerError>;

    /// Close the underlying connection.
    async fn close(self);
}
