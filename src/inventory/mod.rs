/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Inventory ledger: per-tier capacity counters and the hold registry.
//!
//! The `(capacity, sold, held)` triple of each tier is the only shared
//! resource in the system that requires synchronized mutation. Every mutator
//! performs its check and its counter update inside a single per-tier
//! critical section, so racing reservations can never push `sold + held`
//! past `capacity`.
//!
//! # Architecture
//!
//! - [`TicketTier`] carries the counters plus sale-window and purchase-limit
//!   policy
//! - [`Hold`] is a time-boxed reservation owned by an order or a waitlist
//!   offer
//! - [`InventoryLedger`] owns both arenas and exposes the atomic
//!   reserve/commit/release protocol
//!
//! The ledger knows nothing about orders or waitlists beyond the opaque
//! [`HoldOwner`] tag it hands back when a hold is reclaimed.

pub mod hold;
pub mod ledger;
pub mod tier;

#[cfg(test)]
mod tests;

pub use hold::{Hold, HoldOwner};
pub use ledger::InventoryLedger;
pub use tier::TicketTier;
