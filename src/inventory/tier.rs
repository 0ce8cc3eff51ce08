/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Ticket tier: a fungible pricing and capacity bucket within an event.

use crate::errors::TicketingError;
use crate::ids::{EventId, TierId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pricing/capacity bucket within an event.
///
/// Tiers allocate fungible units, not individual seats. The counter triple
/// `(capacity, sold, held)` must satisfy `sold + held <= capacity` at all
/// times; [`InventoryLedger`] enforces this on every mutation.
///
/// [`InventoryLedger`]: super::InventoryLedger
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use ticketing_rs::ids::EventId;
/// use ticketing_rs::inventory::TicketTier;
///
/// let tier = TicketTier::new(EventId::new(), "General Admission", Decimal::new(2500, 2), 100);
/// assert_eq!(tier.available(), 100);
/// assert!(!tier.is_sold_out());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketTier {
    /// Tier identifier.
    pub id: TierId,

    /// The event this tier belongs to.
    pub event_id: EventId,

    /// Display name, e.g. "VIP" or "General Admission".
    pub name: String,

    /// Unit price snapshotted into order items at purchase time.
    pub price: Decimal,

    /// Fixed total number of units.
    pub capacity: u32,

    /// Units confirmed as sold.
    pub sold: u32,

    /// Units reserved by in-flight holds.
    pub held: u32,

    /// Minimum units per buyer-initiated purchase.
    pub min_purchase: u32,

    /// Maximum units per buyer-initiated purchase.
    pub max_purchase: u32,

    /// Sale window start (milliseconds since epoch), if bounded.
    pub sale_start: Option<u64>,

    /// Sale window end (milliseconds since epoch), if bounded.
    pub sale_end: Option<u64>,

    /// Whether the tier is open for purchase at all.
    pub active: bool,

    /// Display order among the event's tiers. Not a correctness concern.
    pub position: u32,
}

impl TicketTier {
    /// Creates an active tier with default purchase limits (1..=10) and an
    /// unbounded sale window.
    #[must_use]
    pub fn new(event_id: EventId, name: impl Into<String>, price: Decimal, capacity: u32) -> Self {
        Self {
            id: TierId::new(),
            event_id,
            name: name.into(),
            price,
            capacity,
            sold: 0,
            held: 0,
            min_purchase: 1,
            max_purchase: 10,
            sale_start: None,
            sale_end: None,
            active: true,
            position: 0,
        }
    }

    /// Units currently available: `capacity - sold - held`.
    #[inline]
    #[must_use]
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.sold).saturating_sub(self.held)
    }

    /// Returns `true` if no units are available.
    #[inline]
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.available() == 0
    }

    /// Returns `true` if the tier is active and `now` falls inside its sale
    /// window.
    #[must_use]
    pub fn is_on_sale(&self, now: u64) -> bool {
        if !self.active {
            return false;
        }
        if let Some(start) = self.sale_start
            && now < start
        {
            return false;
        }
        if let Some(end) = self.sale_end
            && now > end
        {
            return false;
        }
        true
    }

    /// Percentage of capacity sold, `0.0..=100.0`.
    #[must_use]
    pub fn percent_sold(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.sold) / f64::from(self.capacity) * 100.0
    }

    /// Validates a buyer-initiated purchase of `quantity` units at `now`.
    ///
    /// Checks sale state and purchase bounds but not availability — the
    /// availability check belongs inside the ledger's critical section.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::TierNotOnSale`] if inactive or outside the window
    /// - [`TicketingError::OutOfPurchaseBounds`] if `quantity` violates the
    ///   tier's limits
    pub fn validate_purchase(&self, quantity: u32, now: u64) -> Result<(), TicketingError> {
        if !self.is_on_sale(now) {
            return Err(TicketingError::TierNotOnSale { tier_id: self.id });
        }
        if quantity < self.min_purchase || quantity > self.max_purchase {
            return Err(TicketingError::OutOfPurchaseBounds {
                tier_id: self.id,
                requested: quantity,
                min: self.min_purchase,
                max: self.max_purchase,
            });
        }
        Ok(())
    }
}
