//! Broker lifecycle: connect, subscribe, pump deliveries into the bus.
//!
//! [`BrokerService::start`] makes the initial connection with a bounded
//! retry and fails when it cannot connect, so the binary can exit before
//! serving traffic. After that a reader task forwards every delivery to
//! the [`MessageBus`] and reconnects (with the same bounded policy) when
//! the session ends. A dispatcher task feeds the bus to the registered
//! handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::MessageBus;
use crate::dispatch::Dispatcher;
use crate::retry::{retry_fixed, RetryError, RetryPolicy};
use crate::transport::{Session, Transport};

/// How long shutdown waits for each background task.
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the running broker subscriber.
pub struct BrokerService {
    cancel: CancellationToken,
    reader: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl BrokerService {
    /// Open a session on `transport` for `exchanges` and start the
    /// background tasks.
    ///
    /// Fails with [`RetryError::Exhausted`] when every connection attempt
    /// fails.
    pub async fn start<T: Transport>(
        transport: T,
        exchanges: Vec<String>,
        policy: RetryPolicy,
        bus: Arc<MessageBus>,
        dispatcher: Dispatcher,
    ) -> Result<Self, RetryError> {
        let cancel = CancellationToken::new();

        let session = connect(&transport, &exchanges, &policy, &cancel).await?;

        let dispatcher_task = tokio::spawn(dispatcher.run(bus.subscribe(), cancel.child_token()));

        let reader_cancel = cancel.child_token();
        let reader = tokio::spawn(async move {
            run_reader(session, &transport, &exchanges, &policy, &bus, &reader_cancel).await;
            tracing::info!("Broker reader task exited");
        });

        Ok(Self {
            cancel,
            reader,
            dispatcher: dispatcher_task,
        })
    }

    /// Stop both tasks, closing the broker connection first.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down broker service");
        self.cancel.cancel();
        let _ = tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, self.reader).await;
        let _ = tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, self.dispatcher).await;
        tracing::info!("Broker service shut down complete");
    }
}

async fn connect<T: Transport>(
    transport: &T,
    exchanges: &[String],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<T::Session, RetryError> {
    retry_fixed("broker connect", policy, cancel, move |_| transport.open(exchanges)).await
}

/// Forward deliveries to the bus until cancelled or reconnection gives up.
async fn run_reader<T: Transport>(
    mut session: T::Session,
    transport: &T,
    exchanges: &[String],
    policy: &RetryPolicy,
    bus: &MessageBus,
    cancel: &CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => None,
            next = session.next_message() => Some(next),
        };
        let Some(next) = next else {
            session.close().await;
            return;
        };

        let reason = match next {
            Ok(Some(message)) => {
                bus.publish(message);
                continue;
            }
            Ok(None) => "Subscription closed by the broker".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            endpoint = %transport.endpoint(),
            reason = %reason,
            "Broker connection lost, reconnecting"
        );
        session.close().await;

        session = match connect(transport, exchanges, policy, cancel).await {
            Ok(session) => session,
            Err(RetryError::Cancelled) => return,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Broker reconnection failed, no more messages will be received"
                );
                return;
            }
        };
    }
}
