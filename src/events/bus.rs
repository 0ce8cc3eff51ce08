/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Broadcast bus for domain events.

use super::types::DomainEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default buffer size for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out channel for [`DomainEvent`]s.
///
/// Cloning the bus is cheap; all clones publish into the same channel.
/// Subscribers that fall behind lose the oldest events — emission never
/// blocks a request path.
///
/// # Examples
///
/// ```
/// use ticketing_rs::events::{DomainEvent, EventBus};
/// use ticketing_rs::ids::TierId;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
/// bus.emit(DomainEvent::CapacityFreed {
///     tier_id: TierId::new(),
///     quantity: 2,
/// });
/// assert!(matches!(
///     rx.try_recv().unwrap(),
///     DomainEvent::CapacityFreed { quantity: 2, .. }
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Creates a bus with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus with a specific buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers.
    ///
    /// A bus with no subscribers silently drops the event.
    pub fn emit(&self, event: DomainEvent) {
        trace!(?event, "domain event");
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
