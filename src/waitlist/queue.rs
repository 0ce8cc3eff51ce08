/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! The waitlist queue and its offer/cascade machinery.

use super::entry::{WaitlistEntry, WaitlistStatus};
use crate::clock::now_millis;
use crate::config::TicketingConfig;
use crate::errors::TicketingError;
use crate::events::{DomainEvent, EventBus};
use crate::ids::{BuyerId, EntryId, EventId, HoldId, TierId};
use crate::inventory::{HoldOwner, InventoryLedger};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// FIFO waitlist per `(event, tier-or-any)` bucket.
///
/// When capacity frees up on a tier, entries are popped in position order —
/// exact-tier entries first, then the event's tier-agnostic bucket — and
/// each popped buyer gets a time-boxed offer backed by a real inventory
/// hold, so the offered unit cannot be sold to anyone else while they
/// decide.
///
/// Offer placement is capacity-checked inside the ledger, so delivering a
/// capacity-freed signal more than once is harmless: the duplicate simply
/// finds nothing left to offer.
pub struct WaitlistQueue {
    entries: DashMap<EntryId, WaitlistEntry>,

    /// Uniqueness index: one entry per (event, buyer, tier) tuple.
    membership: DashMap<(EventId, BuyerId, Option<TierId>), EntryId>,

    /// Per-bucket position sequences. Assignment is a single `fetch_add`,
    /// so positions are strictly monotonic and ties cannot occur.
    positions: DashMap<(EventId, Option<TierId>), AtomicU64>,

    ledger: Arc<InventoryLedger>,
    bus: EventBus,
    config: TicketingConfig,
}

impl WaitlistQueue {
    /// Creates an empty queue over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<InventoryLedger>, bus: EventBus, config: TicketingConfig) -> Self {
        Self {
            entries: DashMap::new(),
            membership: DashMap::new(),
            positions: DashMap::new(),
            ledger,
            bus,
            config,
        }
    }

    /// Joins the waitlist for an event, optionally pinned to one tier.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::AlreadyOnWaitlist`] if the buyer already
    /// has an entry for this (event, tier) bucket.
    pub fn join(
        &self,
        event_id: EventId,
        tier_id: Option<TierId>,
        buyer_id: BuyerId,
    ) -> Result<WaitlistEntry, TicketingError> {
        let entry_id = EntryId::new();
        match self.membership.entry((event_id, buyer_id, tier_id)) {
            Entry::Occupied(occupied) => {
                return Err(TicketingError::AlreadyOnWaitlist {
                    entry_id: *occupied.get(),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry_id);
            }
        }

        let position = self
            .positions
            .entry((event_id, tier_id))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::SeqCst)
            + 1;

        let entry = WaitlistEntry {
            id: entry_id,
            event_id,
            tier_id,
            buyer_id,
            position,
            status: WaitlistStatus::Waiting,
            joined_at: now_millis(),
            notified_at: None,
            notification_expires_at: None,
            responded_at: None,
            hold_id: None,
        };
        self.entries.insert(entry_id, entry.clone());

        info!(%entry_id, %event_id, ?tier_id, position, "joined waitlist");
        self.bus.emit(DomainEvent::WaitlistJoined {
            entry_id,
            event_id,
            tier_id,
            position,
        });
        Ok(entry)
    }

    /// Removes an entry from the waitlist.
    ///
    /// Valid only while Waiting or Notified. Leaving while Notified
    /// releases the offer hold and cascades the unit to the next buyer.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::EntryNotFound`]
    /// - [`TicketingError::InvalidStateTransition`] for fulfilled or
    ///   expired entries
    pub fn leave(&self, entry_id: EntryId) -> Result<WaitlistEntry, TicketingError> {
        let removed = self.entries.remove_if(&entry_id, |_, e| {
            matches!(e.status, WaitlistStatus::Waiting | WaitlistStatus::Notified)
        });

        let Some((_, entry)) = removed else {
            return match self.entries.get(&entry_id) {
                Some(entry) => {
                    warn!(%entry_id, status = ?entry.status, "leave on settled entry");
                    Err(TicketingError::InvalidStateTransition {
                        action: "leave",
                        state: format!("{:?}", entry.status).to_lowercase(),
                    })
                }
                None => Err(TicketingError::EntryNotFound { entry_id }),
            };
        };

        self.membership
            .remove(&(entry.event_id, entry.buyer_id, entry.tier_id));

        info!(%entry_id, "left waitlist");
        self.bus.emit(DomainEvent::WaitlistLeft { entry_id });

        // A Notified leaver gives their offered unit back to the queue.
        if let Some(hold_id) = entry.hold_id
            && let Some(hold) = self.ledger.release(hold_id)
        {
            self.on_capacity_freed(hold.tier_id, hold.quantity);
        }
        Ok(entry)
    }

    /// Offers up to `quantity` freed units of a tier down the queue.
    ///
    /// Entries are popped in position order, exact-tier bucket first, then
    /// the event's generic bucket. Each popped entry transitions to
    /// Notified with a hold of one unit expiring after the configured
    /// notification window.
    pub fn on_capacity_freed(&self, tier_id: TierId, quantity: u32) {
        let Some(tier) = self.ledger.tier(tier_id) else {
            warn!(%tier_id, "capacity freed for unknown tier");
            return;
        };
        let event_id = tier.event_id;
        debug!(%tier_id, %event_id, quantity, "reallocating freed capacity");

        let mut remaining = quantity;
        while remaining > 0 {
            let Some(entry_id) = self.next_waiting(event_id, tier_id) else {
                break;
            };

            // Hold first, transition second: the offered unit must be off
            // the market before the buyer hears about it.
            let owner = HoldOwner::WaitlistOffer { entry_id };
            let hold = match
                self.ledger
                    .reserve_offer(tier_id, 1, self.config.notify_window, owner)
            {
                Ok(hold) => hold,
                Err(TicketingError::InsufficientInventory { .. }) => break,
                Err(e) => {
                    warn!(%tier_id, error = %e, "offer hold failed");
                    break;
                }
            };

            let now = now_millis();
            let mut notified = false;
            if let Some(mut entry) = self.entries.get_mut(&entry_id)
                && entry.status == WaitlistStatus::Waiting
            {
                entry.status = WaitlistStatus::Notified;
                entry.notified_at = Some(now);
                entry.notification_expires_at = Some(hold.expires_at);
                entry.hold_id = Some(hold.id);
                notified = true;
            }

            if notified {
                remaining -= 1;
                info!(%entry_id, %tier_id, hold_id = %hold.id, "waitlist offer placed");
                self.bus.emit(DomainEvent::WaitlistNotified {
                    entry_id,
                    hold_id: hold.id,
                    expires_at: hold.expires_at,
                });
            } else {
                // The entry left between selection and transition; put the
                // unit back and pick the next candidate.
                self.ledger.release(hold.id);
            }
        }
    }

    /// Records a buyer's response to an outstanding offer.
    ///
    /// Accept transitions the entry to Fulfilled and leaves the offer hold
    /// in place for checkout (see `OrderLifecycle::create_order_from_offer`).
    /// Decline transitions to Expired, releases the hold, and cascades the
    /// unit to the next buyer.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::EntryNotFound`]
    /// - [`TicketingError::InvalidStateTransition`] unless Notified
    /// - [`TicketingError::HoldExpired`] if the offer lapsed before the
    ///   response arrived; the entry is expired as if it never responded
    pub fn respond(&self, entry_id: EntryId, accept: bool) -> Result<WaitlistEntry, TicketingError> {
        let now = now_millis();

        enum Outcome {
            Fulfilled(WaitlistEntry),
            Declined(WaitlistEntry, Option<HoldId>),
            Lapsed(Option<HoldId>, TicketingError),
        }

        let outcome = {
            let mut entry = self
                .entries
                .get_mut(&entry_id)
                .ok_or(TicketingError::EntryNotFound { entry_id })?;

            if entry.status != WaitlistStatus::Notified {
                warn!(%entry_id, status = ?entry.status, "respond on non-notified entry");
                return Err(TicketingError::InvalidStateTransition {
                    action: "respond",
                    state: format!("{:?}", entry.status).to_lowercase(),
                });
            }

            if entry.offer_expired(now) {
                let deadline = entry.notification_expires_at.unwrap_or(0);
                let hold_id = entry.hold_id.take();
                entry.status = WaitlistStatus::Expired;
                Outcome::Lapsed(
                    hold_id,
                    TicketingError::HoldExpired {
                        hold_id: hold_id.unwrap_or_default(),
                        expired_at: deadline,
                    },
                )
            } else if accept {
                entry.status = WaitlistStatus::Fulfilled;
                entry.responded_at = Some(now);
                Outcome::Fulfilled(entry.clone())
            } else {
                entry.status = WaitlistStatus::Expired;
                entry.responded_at = Some(now);
                let hold_id = entry.hold_id.take();
                Outcome::Declined(entry.clone(), hold_id)
            }
        };

        match outcome {
            Outcome::Fulfilled(entry) => {
                info!(%entry_id, "waitlist offer accepted");
                self.bus.emit(DomainEvent::WaitlistFulfilled { entry_id });
                Ok(entry)
            }
            Outcome::Declined(entry, hold_id) => {
                info!(%entry_id, "waitlist offer declined");
                self.bus.emit(DomainEvent::WaitlistEntryExpired { entry_id });
                if let Some(hold) = hold_id.and_then(|h| self.ledger.release(h)) {
                    self.on_capacity_freed(hold.tier_id, hold.quantity);
                }
                Ok(entry)
            }
            Outcome::Lapsed(hold_id, err) => {
                warn!(%entry_id, "response after offer deadline");
                self.bus.emit(DomainEvent::WaitlistEntryExpired { entry_id });
                if let Some(hold) = hold_id.and_then(|h| self.ledger.release(h)) {
                    self.on_capacity_freed(hold.tier_id, hold.quantity);
                }
                Err(err)
            }
        }
    }

    /// Expires every un-actioned offer whose deadline has passed at `now`,
    /// cascading each freed unit to the next queued buyer.
    ///
    /// Returns the number of entries expired. This is the waitlist's half
    /// of the background sweep.
    pub fn expire_due_at(&self, now: u64) -> usize {
        let due: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|e| e.offer_expired(now))
            .map(|e| e.id)
            .collect();

        let mut freed: Vec<(TierId, u32)> = Vec::new();
        let mut expired = 0;
        for entry_id in due {
            let mut lapsed_hold = None;
            if let Some(mut entry) = self.entries.get_mut(&entry_id)
                && entry.offer_expired(now)
            {
                entry.status = WaitlistStatus::Expired;
                lapsed_hold = entry.hold_id.take();
            }
            let Some(hold_id) = lapsed_hold else { continue };

            expired += 1;
            info!(%entry_id, %hold_id, "waitlist offer lapsed");
            self.bus.emit(DomainEvent::WaitlistEntryExpired { entry_id });
            if let Some(hold) = self.ledger.release(hold_id) {
                freed.push((hold.tier_id, hold.quantity));
            }
        }

        for (tier_id, quantity) in freed {
            self.on_capacity_freed(tier_id, quantity);
        }
        expired
    }

    /// Expires due offers using the wall clock.
    pub fn expire_due(&self) -> usize {
        self.expire_due_at(now_millis())
    }

    /// Returns a snapshot of an entry.
    #[must_use]
    pub fn entry(&self, entry_id: EntryId) -> Option<WaitlistEntry> {
        self.entries.get(&entry_id).map(|e| e.clone())
    }

    /// All entries of a bucket in position order.
    #[must_use]
    pub fn entries_for_bucket(
        &self,
        event_id: EventId,
        tier_id: Option<TierId>,
    ) -> Vec<WaitlistEntry> {
        let mut entries: Vec<WaitlistEntry> = self
            .entries
            .iter()
            .filter(|e| e.event_id == event_id && e.tier_id == tier_id)
            .map(|e| e.clone())
            .collect();
        entries.sort_by_key(|e| e.position);
        entries
    }

    /// Number of entries still Waiting in a bucket.
    #[must_use]
    pub fn waiting_count(&self, event_id: EventId, tier_id: Option<TierId>) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                e.event_id == event_id
                    && e.tier_id == tier_id
                    && e.status == WaitlistStatus::Waiting
            })
            .count()
    }

    /// Picks the lowest-position Waiting entry for a tier: exact-tier
    /// entries win over the event's generic bucket.
    fn next_waiting(&self, event_id: EventId, tier_id: TierId) -> Option<EntryId> {
        self.lowest_waiting(event_id, Some(tier_id))
            .or_else(|| self.lowest_waiting(event_id, None))
    }

    fn lowest_waiting(&self, event_id: EventId, tier_id: Option<TierId>) -> Option<EntryId> {
        self.entries
            .iter()
            .filter(|e| {
                e.event_id == event_id
                    && e.tier_id == tier_id
                    && e.status == WaitlistStatus::Waiting
            })
            .min_by_key(|e| e.position)
            .map(|e| e.id)
    }
}
