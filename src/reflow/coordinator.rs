/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Stateless coordinator between inventory-freeing events and the waitlist.

use crate::events::{DomainEvent, EventBus};
use crate::ids::TierId;
use crate::waitlist::WaitlistQueue;
use std::sync::Arc;
use tracing::debug;

/// A batch of units returned to a tier's available capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freed {
    /// The tier with new availability.
    pub tier_id: TierId,
    /// Units freed.
    pub quantity: u32,
}

/// Routes freed capacity into [`WaitlistQueue::on_capacity_freed`].
///
/// The coordinator holds no state of its own. At-least-once delivery is
/// tolerated because the queue's pop-and-hold is capacity-checked — a
/// duplicate signal finds nothing left to offer.
pub struct ReflowCoordinator {
    waitlist: Arc<WaitlistQueue>,
    bus: EventBus,
}

impl ReflowCoordinator {
    /// Creates a coordinator feeding the given queue.
    #[must_use]
    pub fn new(waitlist: Arc<WaitlistQueue>, bus: EventBus) -> Self {
        Self { waitlist, bus }
    }

    /// Announces freed capacity and offers it down the waitlist.
    ///
    /// Zero-quantity signals are dropped without side effects.
    pub fn capacity_freed(&self, tier_id: TierId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        debug!(%tier_id, quantity, "capacity freed");
        self.bus
            .emit(DomainEvent::CapacityFreed { tier_id, quantity });
        self.waitlist.on_capacity_freed(tier_id, quantity);
    }

    /// Routes a batch of freeing events, one signal per entry.
    pub fn capacity_freed_batch(&self, batches: &[Freed]) {
        for freed in batches {
            self.capacity_freed(freed.tier_id, freed.quantity);
        }
    }
}
