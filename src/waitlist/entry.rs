/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Waitlist entry record.

use crate::ids::{BuyerId, EntryId, EventId, HoldId, TierId};
use serde::{Deserialize, Serialize};

/// State of a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Queued, no offer outstanding.
    Waiting,
    /// Holding a time-boxed purchase offer.
    Notified,
    /// Accepted an offer.
    Fulfilled,
    /// Declined an offer or let it lapse.
    Expired,
}

/// One buyer waiting for one unit of an event (optionally a specific tier).
///
/// `position` is assigned from a per-bucket atomic sequence, so it is
/// strictly monotonic within a bucket and ties cannot occur. A buyer may
/// hold at most one entry per `(event, buyer, tier)` tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// The event waited on.
    pub event_id: EventId,
    /// The specific tier, or `None` to accept any tier at the event.
    pub tier_id: Option<TierId>,
    /// The waiting buyer.
    pub buyer_id: BuyerId,
    /// FIFO position within the bucket (1-based, monotonic).
    pub position: u64,
    /// Entry state.
    pub status: WaitlistStatus,
    /// When the buyer joined (ms).
    pub joined_at: u64,
    /// When the offer was made (ms).
    pub notified_at: Option<u64>,
    /// Deadline (ms) for responding to the offer.
    pub notification_expires_at: Option<u64>,
    /// When the buyer responded (ms).
    pub responded_at: Option<u64>,
    /// The hold backing the outstanding offer, while Notified.
    pub hold_id: Option<HoldId>,
}

impl WaitlistEntry {
    /// Returns `true` if an outstanding offer has passed its deadline at `now`.
    #[must_use]
    pub fn offer_expired(&self, now: u64) -> bool {
        self.status == WaitlistStatus::Notified
            && self.notification_expires_at.is_some_and(|d| now > d)
    }
}
