/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! The inventory ledger: atomic reserve/commit/release over per-tier counters.

use super::hold::{Hold, HoldOwner};
use super::tier::TicketTier;
use crate::clock::now_millis;
use crate::errors::TicketingError;
use crate::events::{DomainEvent, EventBus};
use crate::ids::{EventId, HoldId, TierId};
use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Concurrent ledger of ticket tiers and outstanding holds.
///
/// Each mutator runs its check and its counter update while holding the
/// tier's map entry exclusively, making the whole operation one atomic unit
/// with respect to every other mutator on the same tier. Competing `reserve`
/// calls are serialized in lock-acquisition order — no FIFO guarantee is
/// made at this layer; fairness for sold-out tiers lives in the waitlist.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use std::time::Duration;
/// use ticketing_rs::events::EventBus;
/// use ticketing_rs::ids::{EventId, OrderId};
/// use ticketing_rs::inventory::{HoldOwner, InventoryLedger, TicketTier};
///
/// let ledger = InventoryLedger::new(EventBus::new());
/// let tier = TicketTier::new(EventId::new(), "GA", Decimal::new(2500, 2), 10);
/// let tier_id = ledger.add_tier(tier);
///
/// let owner = HoldOwner::Order { order_id: OrderId::new() };
/// let hold = ledger
///     .reserve(tier_id, 5, Duration::from_secs(300), owner)
///     .unwrap();
/// assert_eq!(ledger.available(tier_id), Some(5));
///
/// ledger.commit(hold.id).unwrap();
/// let tier = ledger.tier(tier_id).unwrap();
/// assert_eq!(tier.sold, 5);
/// assert_eq!(tier.held, 0);
/// ```
#[derive(Debug)]
pub struct InventoryLedger {
    /// Tier arena; the map entry lock is the atomic-update primitive for
    /// the `(capacity, sold, held)` triple.
    tiers: DashMap<TierId, TicketTier>,

    /// Hold registry, keyed separately from tiers so hold churn never
    /// contends on tier rows it does not touch.
    holds: DashMap<HoldId, Hold>,

    /// Bus for hold lifecycle events.
    bus: EventBus,
}

impl InventoryLedger {
    /// Creates an empty ledger publishing on the given bus.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            tiers: DashMap::new(),
            holds: DashMap::new(),
            bus,
        }
    }

    /// Registers a tier and returns its id.
    pub fn add_tier(&self, tier: TicketTier) -> TierId {
        let tier_id = tier.id;
        debug!(%tier_id, event_id = %tier.event_id, capacity = tier.capacity, "tier registered");
        self.tiers.insert(tier_id, tier);
        tier_id
    }

    /// Returns a snapshot of a tier.
    #[must_use]
    pub fn tier(&self, tier_id: TierId) -> Option<TicketTier> {
        self.tiers.get(&tier_id).map(|t| t.clone())
    }

    /// Returns all tiers of an event, ordered by display position.
    #[must_use]
    pub fn tiers_for_event(&self, event_id: EventId) -> Vec<TicketTier> {
        let mut tiers: Vec<TicketTier> = self
            .tiers
            .iter()
            .filter(|t| t.event_id == event_id)
            .map(|t| t.clone())
            .collect();
        tiers.sort_by_key(|t| t.position);
        tiers
    }

    /// Units currently available on a tier, or `None` if the tier is unknown.
    #[must_use]
    pub fn available(&self, tier_id: TierId) -> Option<u32> {
        self.tiers.get(&tier_id).map(|t| t.available())
    }

    /// Returns a snapshot of a hold.
    #[must_use]
    pub fn hold(&self, hold_id: HoldId) -> Option<Hold> {
        self.holds.get(&hold_id).map(|h| *h)
    }

    /// Number of outstanding holds.
    #[must_use]
    pub fn active_holds(&self) -> usize {
        self.holds.len()
    }

    /// Reserves `quantity` units for a buyer-initiated purchase.
    ///
    /// Checks that the tier is on sale, that `quantity` is within the tier's
    /// purchase limits, and that enough units are available, then increments
    /// `held` — all inside the tier's critical section.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::TierNotFound`]
    /// - [`TicketingError::TierNotOnSale`]
    /// - [`TicketingError::OutOfPurchaseBounds`]
    /// - [`TicketingError::InsufficientInventory`]
    pub fn reserve(
        &self,
        tier_id: TierId,
        quantity: u32,
        ttl: Duration,
        owner: HoldOwner,
    ) -> Result<Hold, TicketingError> {
        self.reserve_inner(tier_id, quantity, ttl, owner, true)
    }

    /// Reserves `quantity` units backing a waitlist purchase offer.
    ///
    /// Offers bypass the sale-window and purchase-bound checks: a freed
    /// single unit must be offerable even when `min_purchase` is higher.
    /// Availability is still checked atomically.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::TierNotFound`]
    /// - [`TicketingError::InsufficientInventory`]
    pub fn reserve_offer(
        &self,
        tier_id: TierId,
        quantity: u32,
        ttl: Duration,
        owner: HoldOwner,
    ) -> Result<Hold, TicketingError> {
        self.reserve_inner(tier_id, quantity, ttl, owner, false)
    }

    fn reserve_inner(
        &self,
        tier_id: TierId,
        quantity: u32,
        ttl: Duration,
        owner: HoldOwner,
        enforce_purchase_policy: bool,
    ) -> Result<Hold, TicketingError> {
        let now = now_millis();
        let mut tier = self
            .tiers
            .get_mut(&tier_id)
            .ok_or(TicketingError::TierNotFound { tier_id })?;

        if enforce_purchase_policy {
            tier.validate_purchase(quantity, now)?;
        }

        let available = tier.available();
        if quantity > available {
            trace!(%tier_id, quantity, available, "reserve rejected");
            return Err(TicketingError::InsufficientInventory {
                tier_id,
                requested: quantity,
                available,
            });
        }

        tier.held += quantity;
        debug_assert!(tier.sold + tier.held <= tier.capacity);

        let hold = Hold {
            id: HoldId::new(),
            tier_id,
            quantity,
            owner,
            expires_at: now + ttl.as_millis() as u64,
        };
        // Inserted while the tier entry is still locked, so the hold becomes
        // visible atomically with the counter update.
        self.holds.insert(hold.id, hold);
        drop(tier);

        debug!(hold_id = %hold.id, %tier_id, quantity, "units held");
        self.bus.emit(DomainEvent::HoldPlaced {
            hold_id: hold.id,
            tier_id,
            quantity,
        });
        Ok(hold)
    }

    /// Commits a hold: moves its quantity from `held` to `sold` and deletes
    /// the hold.
    ///
    /// An already-expired hold is released instead (its units return to
    /// available) and the call fails with [`TicketingError::HoldExpired`] —
    /// the caller must re-reserve, never assume success.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::HoldNotFound`] if the hold was already committed
    ///   or released
    /// - [`TicketingError::HoldExpired`] if the hold passed its deadline
    pub fn commit(&self, hold_id: HoldId) -> Result<Hold, TicketingError> {
        let now = now_millis();
        let tier_id = self
            .holds
            .get(&hold_id)
            .map(|h| h.tier_id)
            .ok_or(TicketingError::HoldNotFound { hold_id })?;

        let mut tier = self
            .tiers
            .get_mut(&tier_id)
            .ok_or(TicketingError::TierNotFound { tier_id })?;

        // Authoritative removal happens under the tier lock; a racing
        // commit/release loses here and sees HoldNotFound.
        let Some((_, hold)) = self.holds.remove(&hold_id) else {
            return Err(TicketingError::HoldNotFound { hold_id });
        };

        if hold.is_expired(now) {
            tier.held = tier.held.saturating_sub(hold.quantity);
            drop(tier);
            warn!(%hold_id, %tier_id, quantity = hold.quantity, "commit on expired hold");
            self.bus.emit(DomainEvent::HoldExpired {
                hold_id,
                tier_id,
                quantity: hold.quantity,
            });
            return Err(TicketingError::HoldExpired {
                hold_id,
                expired_at: hold.expires_at,
            });
        }

        tier.held = tier.held.saturating_sub(hold.quantity);
        tier.sold += hold.quantity;
        debug_assert!(tier.sold + tier.held <= tier.capacity);
        drop(tier);

        debug!(%hold_id, %tier_id, quantity = hold.quantity, "hold committed");
        Ok(hold)
    }

    /// Releases a hold, returning its units to available capacity.
    ///
    /// Idempotent: releasing an unknown or already-released hold returns
    /// `None` and changes nothing, so duplicate expiry/cancel triggers are
    /// harmless.
    pub fn release(&self, hold_id: HoldId) -> Option<Hold> {
        self.release_with_event(hold_id, false)
    }

    fn release_with_event(&self, hold_id: HoldId, expired: bool) -> Option<Hold> {
        let tier_id = self.holds.get(&hold_id).map(|h| h.tier_id)?;
        let mut tier = self.tiers.get_mut(&tier_id)?;
        let (_, hold) = self.holds.remove(&hold_id)?;

        tier.held = tier.held.saturating_sub(hold.quantity);
        drop(tier);

        debug!(%hold_id, %tier_id, quantity = hold.quantity, expired, "hold released");
        let event = if expired {
            DomainEvent::HoldExpired {
                hold_id,
                tier_id,
                quantity: hold.quantity,
            }
        } else {
            DomainEvent::HoldReleased {
                hold_id,
                tier_id,
                quantity: hold.quantity,
            }
        };
        self.bus.emit(event);
        Some(hold)
    }

    /// Transfers a live hold to a new owner with a fresh TTL.
    ///
    /// Used when an accepted waitlist offer is handed to a checkout order:
    /// the reserved units move owners without ever re-entering the open
    /// market. Counters are untouched.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::HoldNotFound`]
    /// - [`TicketingError::HoldExpired`] if the hold already lapsed (the
    ///   sweep will reclaim it)
    pub fn rebind_hold(
        &self,
        hold_id: HoldId,
        owner: HoldOwner,
        ttl: Duration,
    ) -> Result<Hold, TicketingError> {
        let now = now_millis();
        let mut hold = self
            .holds
            .get_mut(&hold_id)
            .ok_or(TicketingError::HoldNotFound { hold_id })?;

        if hold.is_expired(now) {
            return Err(TicketingError::HoldExpired {
                hold_id,
                expired_at: hold.expires_at,
            });
        }

        hold.owner = owner;
        hold.expires_at = now + ttl.as_millis() as u64;
        debug!(%hold_id, ?owner, "hold rebound");
        Ok(*hold)
    }

    /// Returns `quantity` previously sold units to available capacity.
    ///
    /// Used by refund and post-confirmation cancellation. Never drives
    /// `sold` below zero; returns the number of units actually freed.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::TierNotFound`] for an unknown tier.
    pub fn release_sold(&self, tier_id: TierId, quantity: u32) -> Result<u32, TicketingError> {
        let mut tier = self
            .tiers
            .get_mut(&tier_id)
            .ok_or(TicketingError::TierNotFound { tier_id })?;

        let freed = quantity.min(tier.sold);
        if freed < quantity {
            warn!(%tier_id, quantity, sold = tier.sold, "release_sold clamped");
        }
        tier.sold -= freed;
        drop(tier);

        debug!(%tier_id, freed, "sold units released");
        Ok(freed)
    }

    /// Releases every hold whose deadline has passed at `now`.
    ///
    /// Returns the released holds so the caller can route freed capacity to
    /// the waitlist and reconcile owning orders or offers. This is the hold
    /// registry's half of the background sweep; lazy reclaim-on-read alone
    /// would leave inventory locked while a tier sees no traffic.
    pub fn expire_due_at(&self, now: u64) -> Vec<Hold> {
        let due: Vec<HoldId> = self
            .holds
            .iter()
            .filter(|h| h.is_expired(now))
            .map(|h| h.id)
            .collect();

        let mut released = Vec::with_capacity(due.len());
        for hold_id in due {
            // A racing commit/release may have won; release is idempotent.
            if let Some(hold) = self.release_with_event(hold_id, true) {
                released.push(hold);
            }
        }
        released
    }

    /// Releases every hold whose deadline has passed, using the wall clock.
    pub fn expire_due(&self) -> Vec<Hold> {
        self.expire_due_at(now_millis())
    }
}
