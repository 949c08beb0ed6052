//! Topic and queue listeners.
//!
//! A [`Listener`] pulls one delivery at a time from a [`MessageSource`],
//! hands it to a [`MessageHandler`] and settles it with the handler's
//! [`Disposition`]. Abandoned deliveries go back to the broker for
//! redelivery.

mod handlers;
mod memory;
mod servicebus;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

pub use handlers::{HearingRequestHandler, HmcMessageHandler};
pub use memory::InMemoryQueue;
pub use servicebus::{ConnectionString, SasTokenProvider, ServiceBusSource};

/// A message locked for this consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: String,
    pub body: Vec<u8>,
    pub delivery_count: u32,
    /// Broker handle used to settle the message.
    pub lock_token: String,
}

impl Delivery {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// How a handled delivery is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Complete,
    Abandon,
}

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("invalid service bus connection string: {0}")]
    ConnectionString(String),
    #[error("message broker responded {status}: {body}")]
    Broker { status: u16, body: String },
    #[error("message broker unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("delivery `{0}` is not locked by this consumer")]
    UnknownLock(String),
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Returns the next locked delivery, or `None` when the entity is empty.
    async fn receive(&self) -> Result<Option<Delivery>, ListenerError>;

    async fn complete(&self, delivery: &Delivery) -> Result<(), ListenerError>;

    async fn abandon(&self, delivery: &Delivery) -> Result<(), ListenerError>;
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> Disposition;
}

/// Sequential receive, handle and settle loop over one entity.
pub struct Listener<S, H> {
    name: &'static str,
    source: Arc<S>,
    handler: Arc<H>,
    poll_interval: Duration,
}

impl<S, H> Listener<S, H>
where
    S: MessageSource + 'static,
    H: MessageHandler + 'static,
{
    pub fn new(
        name: &'static str,
        source: Arc<S>,
        handler: Arc<H>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            name,
            source,
            handler,
            poll_interval,
        }
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped. The
    /// delivery in hand is always settled before the loop exits.
    #[instrument(skip_all, fields(listener = self.name))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "listener started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let idle = match self.poll_once().await {
                Ok(handled) => !handled,
                Err(err) => {
                    error!(error = %err, "failed to receive message");
                    true
                }
            };
            if !idle {
                continue;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("listener stopped");
    }

    /// Receives and settles at most one delivery. Returns whether one was
    /// handled.
    pub async fn poll_once(&self) -> Result<bool, ListenerError> {
        let Some(delivery) = self.source.receive().await? else {
            return Ok(false);
        };
        debug!(
            message_id = %delivery.message_id,
            delivery_count = delivery.delivery_count,
            "message received"
        );

        let settled = match self.handler.handle(&delivery).await {
            Disposition::Complete => self.source.complete(&delivery).await,
            Disposition::Abandon => self.source.abandon(&delivery).await,
        };
        if let Err(err) = settled {
            warn!(message_id = %delivery.message_id, error = %err, "failed to settle message");
        }
        Ok(true)
    }
}
