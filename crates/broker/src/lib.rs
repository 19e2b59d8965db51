//! RabbitMQ subscription for the Orientati directory service.
//!
//! [`BrokerService`] connects through a [`Transport`] with a fixed-count
//! retry loop, subscribes to every configured exchange and forwards each
//! delivery to the in-process [`MessageBus`]. A [`Dispatcher`] task routes
//! messages from the bus to the [`MessageHandler`]s registered for their
//! exchange. [`AmqpTransport`] is the production transport.

pub mod amqp;
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod retry;
pub mod service;
pub mod transport;

pub use amqp::AmqpTransport;
pub use bus::{BrokerMessage, MessageBus};
pub use config::BrokerConfig;
pub use dispatch::{Dispatcher, LoggingHandler, MessageHandler};
pub use retry::{RetryError, RetryPolicy};
pub use service::BrokerService;
pub use transport::{BrokerError, Session, Transport};
