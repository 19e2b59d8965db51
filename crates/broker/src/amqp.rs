//! AMQP 0-9-1 transport for RabbitMQ, built on `lapin`.
//!
//! Each session declares every configured exchange as a durable topic
//! exchange, binds one exclusive auto-delete queue to all of them with
//! `#` and consumes from it. Deliveries are acked once they are on the
//! in-process bus.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties, Consumer, ExchangeKind};

use crate::bus::BrokerMessage;
use crate::transport::{BrokerError, Session, Transport};

/// Routing pattern that matches every key on a topic exchange.
const MATCH_ALL: &str = "#";

/// AMQP reply code for a normal close.
const REPLY_SUCCESS: u16 = 200;

/// Connects to RabbitMQ with an `amqp://` URI.
#[derive(Debug, Clone)]
pub struct AmqpTransport {
    uri: String,
}

impl AmqpTransport {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[async_trait]
impl Transport for AmqpTransport {
    type Session = AmqpSession;

    async fn open(&self, exchanges: &[String]) -> Result<AmqpSession, BrokerError> {
        if exchanges.is_empty() {
            return Err(BrokerError::Rejected("no exchanges configured".into()));
        }

        let connection = Connection::connect(&self.uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        for exchange in exchanges {
            channel
                .exchange_declare(
                    exchange,
                    ExchangeKind::Topic,
                    ExchangeDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            channel
                .queue_bind(
                    queue.name().as_str(),
                    exchange,
                    MATCH_ALL,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }

        let consumer_tag = format!("orientati-{}", uuid::Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                queue.name().as_str(),
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tracing::info!(
            endpoint = %self.endpoint(),
            queue = queue.name().as_str(),
            ?exchanges,
            "AMQP subscription ready"
        );
        Ok(AmqpSession {
            connection,
            consumer,
        })
    }

    fn endpoint(&self) -> String {
        redact_uri(&self.uri)
    }
}

/// A consumer plus the connection that owns it.
pub struct AmqpSession {
    connection: Connection,
    consumer: Consumer,
}

#[async_trait]
impl Session for AmqpSession {
    async fn next_message(&mut self) -> Result<Option<BrokerMessage>, BrokerError> {
        let Some(delivery) = self.consumer.next().await else {
            return Ok(None);
        };
        let delivery = delivery?;
        let message = BrokerMessage::new(
            delivery.exchange.as_str(),
            delivery.routing_key.as_str(),
            &delivery.data,
        );
        delivery.acker.ack(BasicAckOptions::default()).await?;
        Ok(Some(message))
    }

    async fn close(self) {
        if let Err(e) = self.connection.close(REPLY_SUCCESS, "shutdown").await {
            tracing::debug!(error = %e, "AMQP close failed");
        }
    }
}

/// Drop the `user:password@` part of an AMQP URI.
fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}
