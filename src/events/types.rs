/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Domain event types.

use crate::ids::{BuyerId, EntryId, EventId, HoldId, OrderId, TicketId, TierId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Events published on the [`EventBus`] after each state change.
///
/// Events are informational: the core never blocks on delivery and drops
/// events for lagging subscribers rather than stalling request paths.
///
/// [`EventBus`]: super::EventBus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A Pending order was created with backing holds for every item.
    OrderCreated {
        /// The new order.
        order_id: OrderId,
        /// The purchasing buyer.
        buyer_id: BuyerId,
        /// The event being purchased.
        event_id: EventId,
        /// Order total.
        total: Decimal,
    },

    /// An order was confirmed and its tickets minted.
    OrderConfirmed {
        /// The confirmed order.
        order_id: OrderId,
        /// Number of tickets issued.
        ticket_count: u32,
    },

    /// An order was cancelled (by user, admin, or failed confirmation).
    OrderCancelled {
        /// The cancelled order.
        order_id: OrderId,
    },

    /// A Pending order passed its deadline and was cancelled by the sweep.
    OrderExpired {
        /// The expired order.
        order_id: OrderId,
    },

    /// A Confirmed order was refunded.
    OrderRefunded {
        /// The refunded order.
        order_id: OrderId,
    },

    /// Tickets were issued for a confirmed order.
    TicketsIssued {
        /// The order the tickets belong to.
        order_id: OrderId,
        /// The minted tickets.
        ticket_ids: Vec<TicketId>,
    },

    /// Inventory units were placed on hold.
    HoldPlaced {
        /// The new hold.
        hold_id: HoldId,
        /// The tier the units came from.
        tier_id: TierId,
        /// Units held.
        quantity: u32,
    },

    /// A hold was released back to available capacity.
    HoldReleased {
        /// The released hold.
        hold_id: HoldId,
        /// The tier the units return to.
        tier_id: TierId,
        /// Units released.
        quantity: u32,
    },

    /// A hold passed its deadline and was reclaimed by the sweep.
    HoldExpired {
        /// The expired hold.
        hold_id: HoldId,
        /// The tier the units return to.
        tier_id: TierId,
        /// Units released.
        quantity: u32,
    },

    /// Freed units are being routed to the waitlist.
    CapacityFreed {
        /// The tier with new availability.
        tier_id: TierId,
        /// Units freed.
        quantity: u32,
    },

    /// A buyer joined a waitlist bucket.
    WaitlistJoined {
        /// The new entry.
        entry_id: EntryId,
        /// The event waited on.
        event_id: EventId,
        /// The specific tier, or `None` for any tier at the event.
        tier_id: Option<TierId>,
        /// FIFO position within the bucket.
        position: u64,
    },

    /// A waitlist buyer received a time-boxed purchase offer.
    WaitlistNotified {
        /// The notified entry.
        entry_id: EntryId,
        /// The hold backing the offer.
        hold_id: HoldId,
        /// Millisecond deadline for the buyer's response.
        expires_at: u64,
    },

    /// A notified entry declined or timed out; its offer was withdrawn.
    WaitlistEntryExpired {
        /// The expired entry.
        entry_id: EntryId,
    },

    /// A notified buyer accepted their offer.
    WaitlistFulfilled {
        /// The fulfilled entry.
        entry_id: EntryId,
    },

    /// A buyer left the waitlist before being fulfilled.
    WaitlistLeft {
        /// The removed entry.
        entry_id: EntryId,
    },
}
