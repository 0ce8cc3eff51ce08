/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Top-level assembly of the ticketing engine.

use crate::config::TicketingConfig;
use crate::events::{DomainEvent, EventBus};
use crate::inventory::InventoryLedger;
use crate::orders::OrderLifecycle;
use crate::reflow::{ExpirySweeper, ReflowCoordinator};
use crate::waitlist::WaitlistQueue;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// The fully wired ticketing engine: ledger, waitlist, reflow, orders and
/// the shared event bus, all over one configuration.
///
/// Construct one per process and share it behind an `Arc`. Every component
/// is individually reachable for direct use; the [`sweeper`](Self::sweeper)
/// method builds the background reclamation task over the same state.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use ticketing_rs::TicketingCore;
/// use ticketing_rs::ids::EventId;
/// use ticketing_rs::inventory::TicketTier;
///
/// let core = TicketingCore::new(Default::default());
/// let tier = TicketTier::new(EventId::new(), "General Admission", Decimal::new(4500, 2), 500);
/// let tier_id = core.ledger.add_tier(tier);
/// assert_eq!(core.ledger.available(tier_id), Some(500));
/// ```
pub struct TicketingCore {
    /// Engine configuration shared by every component.
    pub config: TicketingConfig,
    /// Broadcast bus all components emit domain events on.
    pub bus: EventBus,
    /// Per-tier capacity counters and active holds.
    pub ledger: Arc<InventoryLedger>,
    /// FIFO waitlist buckets and offer handling.
    pub waitlist: Arc<WaitlistQueue>,
    /// Freed-capacity routing into the waitlist.
    pub reflow: Arc<ReflowCoordinator>,
    /// Order state machine and ticket registry.
    pub orders: Arc<OrderLifecycle>,
}

impl TicketingCore {
    /// Wires up a complete engine from the given configuration.
    #[must_use]
    pub fn new(config: TicketingConfig) -> Self {
        let bus = EventBus::new();
        let ledger = Arc::new(InventoryLedger::new(bus.clone()));
        let waitlist = Arc::new(WaitlistQueue::new(
            Arc::clone(&ledger),
            bus.clone(),
            config,
        ));
        let reflow = Arc::new(ReflowCoordinator::new(Arc::clone(&waitlist), bus.clone()));
        let orders = Arc::new(OrderLifecycle::new(
            Arc::clone(&ledger),
            Arc::clone(&reflow),
            bus.clone(),
            config,
        ));

        Self {
            config,
            bus,
            ledger,
            waitlist,
            reflow,
            orders,
        }
    }

    /// Builds the background expiry sweeper over this engine's state.
    ///
    /// The sweeper stops when `true` is sent on the shutdown channel.
    #[must_use]
    pub fn sweeper(&self, shutdown_rx: watch::Receiver<bool>) -> ExpirySweeper {
        ExpirySweeper::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.orders),
            Arc::clone(&self.waitlist),
            Arc::clone(&self.reflow),
            self.config,
            shutdown_rx,
        )
    }

    /// Subscribes to the engine's domain event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.bus.subscribe()
    }
}

impl Default for TicketingCore {
    fn default() -> Self {
        Self::new(TicketingConfig::default())
    }
}
