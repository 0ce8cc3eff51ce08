/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Holds: time-boxed inventory reservations.

use crate::ids::{EntryId, HoldId, OrderId, TierId};
use serde::{Deserialize, Serialize};

/// Who a hold reserves units for.
///
/// The ledger treats owners as opaque tags; it hands them back when a hold
/// is reclaimed so the sweep can route the freed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoldOwner {
    /// Units back a Pending order item.
    Order {
        /// The owning order.
        order_id: OrderId,
    },

    /// Units back a time-boxed waitlist purchase offer.
    WaitlistOffer {
        /// The notified waitlist entry.
        entry_id: EntryId,
    },
}

/// A time-boxed reservation of inventory units.
///
/// A hold is created by `reserve`, and terminated by exactly one of:
/// `commit` (units move to `sold`), `release` (units return to available),
/// or expiry via the sweep (same effect as `release`). A hold is never
/// partially committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Hold identifier.
    pub id: HoldId,

    /// The tier the units are reserved from.
    pub tier_id: TierId,

    /// Number of units reserved.
    pub quantity: u32,

    /// Who the units are reserved for.
    pub owner: HoldOwner,

    /// Millisecond deadline after which the hold may be reclaimed.
    pub expires_at: u64,
}

impl Hold {
    /// Returns `true` if the hold's deadline has passed at `now`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
