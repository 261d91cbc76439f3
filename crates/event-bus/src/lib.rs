use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use search_debugger_core_types::CoreError;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), CoreError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Broadcast bus; every subscriber sees every event published after it subscribed.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    /// Publishing before anyone subscribes is `Ok`: the event is dropped.
    ///
    /// Search sources start emitting before a view observes them, and a
    /// late observer catches up through a full state resend rather than
    /// the bus, so an empty audience is not a delivery failure.
    async fn publish(&self, event: E) -> Result<(), CoreError> {
        if self.sender.receiver_count() == 0 {
            trace!("event published without subscribers");
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|err| CoreError::new(err.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}
