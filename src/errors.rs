/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Error taxonomy for the ticketing core.
//!
//! Every variant maps to a distinct user-facing condition: a fresh
//! `InsufficientInventory` means "sold out", `HoldExpired` on payment
//! confirmation means "your hold expired, please reorder", and
//! `AlreadyOnWaitlist` means "already waiting". None of these should be
//! collapsed into a generic failure by callers.
//!
//! All errors are terminal for the triggering request — the core never
//! retries a failed reservation on the caller's behalf.

use crate::ids::{EntryId, HoldId, OrderId, TierId};
use thiserror::Error;

/// Errors returned by inventory, order, and waitlist operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketingError {
    /// The requested tier does not exist in the ledger.
    #[error("ticket tier {tier_id} not found")]
    TierNotFound {
        /// The tier that was requested.
        tier_id: TierId,
    },

    /// Not enough unreserved capacity to satisfy the request.
    #[error("insufficient inventory for tier {tier_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        /// The tier that was requested.
        tier_id: TierId,
        /// Units requested.
        requested: u32,
        /// Units actually available at the time of the check.
        available: u32,
    },

    /// The tier is inactive or outside its sale window.
    #[error("ticket tier {tier_id} is not on sale")]
    TierNotOnSale {
        /// The tier that was requested.
        tier_id: TierId,
    },

    /// The requested quantity violates the tier's purchase limits.
    #[error("quantity {requested} outside purchase bounds {min}..={max} for tier {tier_id}")]
    OutOfPurchaseBounds {
        /// The tier that was requested.
        tier_id: TierId,
        /// Units requested.
        requested: u32,
        /// Minimum units per purchase.
        min: u32,
        /// Maximum units per purchase.
        max: u32,
    },

    /// No hold exists with the given id.
    #[error("hold {hold_id} not found")]
    HoldNotFound {
        /// The hold that was requested.
        hold_id: HoldId,
    },

    /// The hold passed its deadline before it could be committed.
    #[error("hold {hold_id} expired at {expired_at} ms")]
    HoldExpired {
        /// The hold that was requested.
        hold_id: HoldId,
        /// Millisecond timestamp at which the hold expired.
        expired_at: u64,
    },

    /// No order exists with the given id.
    #[error("order {order_id} not found")]
    OrderNotFound {
        /// The order that was requested.
        order_id: OrderId,
    },

    /// An order was created with no items.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// The buyer already has a waitlist entry for this (event, tier) bucket.
    #[error("buyer already on waitlist (entry {entry_id})")]
    AlreadyOnWaitlist {
        /// The pre-existing entry.
        entry_id: EntryId,
    },

    /// No waitlist entry exists with the given id.
    #[error("waitlist entry {entry_id} not found")]
    EntryNotFound {
        /// The entry that was requested.
        entry_id: EntryId,
    },

    /// The requested operation is not valid in the current state.
    ///
    /// This always indicates a programming error or a lost race, never a
    /// normal condition — callers must surface it, not swallow it.
    #[error("invalid state transition: {action} while {state}")]
    InvalidStateTransition {
        /// The operation that was attempted.
        action: &'static str,
        /// The state the aggregate was in.
        state: String,
    },
}

impl TicketingError {
    /// Returns `true` if the error indicates the tier is sold out.
    #[inline]
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        matches!(self, Self::InsufficientInventory { .. })
    }

    /// Returns `true` if the error indicates an expired hold.
    #[inline]
    #[must_use]
    pub fn is_hold_expired(&self) -> bool {
        matches!(self, Self::HoldExpired { .. })
    }
}
