/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Order aggregate and its line items.

use crate::ids::{BuyerId, EventId, HoldId, OrderId, TierId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created with backing holds, awaiting payment confirmation.
    Pending,
    /// Paid; inventory committed and tickets minted.
    Confirmed,
    /// Terminated before or after confirmation; inventory returned.
    Cancelled,
    /// Confirmed order whose payment was returned; inventory released.
    Refunded,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

/// Payment state tracked alongside the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No verified payment yet.
    Pending,
    /// Externally-verified payment attached.
    Completed,
    /// Confirmation failed after an external charge; caller must refund.
    Failed,
    /// Payment returned to the buyer.
    Refunded,
}

/// A line item: a quantity of one tier at a snapshotted price.
///
/// `unit_price` is captured at order time and is immune to later tier price
/// changes. While the order is Pending, `hold_id` points at the inventory
/// hold backing this item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// The tier purchased.
    pub tier_id: TierId,
    /// Units purchased.
    pub quantity: u32,
    /// Price per unit at order time.
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub subtotal: Decimal,
    /// Backing hold while the order is Pending; `None` in terminal states.
    pub hold_id: Option<HoldId>,
}

/// A buyer's purchase of one or more tiers of a single event.
///
/// The order exclusively owns its items and, after confirmation, the
/// tickets it produced. A Pending order always has a hold per item; a
/// terminal order has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// The purchasing buyer (opaque reference).
    pub buyer_id: BuyerId,
    /// The event purchased (opaque reference).
    pub event_id: EventId,
    /// Line items.
    pub items: Vec<OrderItem>,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Sum of item subtotals.
    pub subtotal: Decimal,
    /// Service fee applied on top of the subtotal.
    pub service_fee: Decimal,
    /// Tax applied on top of the subtotal.
    pub tax: Decimal,
    /// `subtotal + service_fee + tax`.
    pub total: Decimal,
    /// Externally-verified payment reference, set at confirmation.
    pub payment_ref: Option<String>,
    /// Wall-clock deadline (ms) for the Pending state.
    pub expires_at: u64,
    /// When the order was created (ms).
    pub created_at: u64,
    /// When the order was confirmed (ms).
    pub confirmed_at: Option<u64>,
    /// When the order was cancelled (ms).
    pub cancelled_at: Option<u64>,
    /// When the order was refunded (ms).
    pub refunded_at: Option<u64>,
    /// Free-form reason recorded at refund time.
    pub refund_reason: Option<String>,
}

impl Order {
    /// Returns `true` while the order awaits payment.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Returns `true` once the order is confirmed.
    #[inline]
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }

    /// Returns `true` if the order reached a terminal released state.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Total units across all items.
    #[must_use]
    pub fn total_tickets(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
