/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! The order state machine and ticket registry.

use super::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use super::ticket::{Ticket, TicketStatus};
use crate::clock::now_millis;
use crate::config::TicketingConfig;
use crate::errors::TicketingError;
use crate::events::{DomainEvent, EventBus};
use crate::ids::{BuyerId, HoldId, OrderId, TicketId, TierId};
use crate::inventory::{HoldOwner, InventoryLedger};
use crate::reflow::{Freed, ReflowCoordinator};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// A requested line item for a new order.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    /// The tier to purchase from.
    pub tier_id: TierId,
    /// Units to purchase.
    pub quantity: u32,
}

/// Drives orders through the Pending → Confirmed/Cancelled/Refunded
/// machine and owns the tickets confirmed orders produce.
///
/// Order creation is all-or-nothing: either every item gets a backing hold
/// or no inventory is touched. Every inventory-freeing transition routes
/// its freed units through the [`ReflowCoordinator`].
///
/// # Examples
///
/// ```no_run
/// use ticketing_rs::TicketingCore;
/// use ticketing_rs::ids::BuyerId;
/// use ticketing_rs::orders::NewOrderItem;
///
/// # fn example(core: &TicketingCore, item: NewOrderItem) -> Result<(), Box<dyn std::error::Error>> {
/// let order = core.orders.create_order(BuyerId::new(), &[item])?;
/// // ... charge the buyer externally ...
/// let confirmed = core.orders.confirm_payment(order.id, "pi_3NxT2")?;
/// assert!(confirmed.is_confirmed());
/// # Ok(())
/// # }
/// ```
pub struct OrderLifecycle {
    orders: DashMap<OrderId, Order>,
    tickets: DashMap<TicketId, Ticket>,
    ledger: Arc<InventoryLedger>,
    reflow: Arc<ReflowCoordinator>,
    bus: EventBus,
    config: TicketingConfig,
}

impl OrderLifecycle {
    /// Creates an order lifecycle over the given ledger and coordinator.
    #[must_use]
    pub fn new(
        ledger: Arc<InventoryLedger>,
        reflow: Arc<ReflowCoordinator>,
        bus: EventBus,
        config: TicketingConfig,
    ) -> Self {
        Self {
            orders: DashMap::new(),
            tickets: DashMap::new(),
            ledger,
            reflow,
            bus,
            config,
        }
    }

    /// Creates a Pending order with a backing hold for every item.
    ///
    /// All items must belong to one event. If any reservation fails, holds
    /// already acquired in this request are released and the whole order
    /// fails — no partial orders, no stranded inventory.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::EmptyOrder`]
    /// - [`TicketingError::InvalidStateTransition`] if items span events
    /// - any `reserve` error for the first failing item
    pub fn create_order(
        &self,
        buyer_id: BuyerId,
        items: &[NewOrderItem],
    ) -> Result<Order, TicketingError> {
        if items.is_empty() {
            return Err(TicketingError::EmptyOrder);
        }

        let order_id = OrderId::new();
        let now = now_millis();
        let mut acquired: Vec<HoldId> = Vec::with_capacity(items.len());
        let mut order_items: Vec<OrderItem> = Vec::with_capacity(items.len());
        let mut event_id = None;

        let rollback = |ledger: &InventoryLedger, acquired: &[HoldId]| {
            for hold_id in acquired {
                ledger.release(*hold_id);
            }
        };

        for item in items {
            let Some(tier) = self.ledger.tier(item.tier_id) else {
                rollback(&self.ledger, &acquired);
                return Err(TicketingError::TierNotFound {
                    tier_id: item.tier_id,
                });
            };

            match event_id {
                None => event_id = Some(tier.event_id),
                Some(expected) if expected != tier.event_id => {
                    rollback(&self.ledger, &acquired);
                    warn!(%order_id, "order items span multiple events");
                    return Err(TicketingError::InvalidStateTransition {
                        action: "create_order",
                        state: "items span multiple events".to_string(),
                    });
                }
                Some(_) => {}
            }

            let owner = HoldOwner::Order { order_id };
            match self
                .ledger
                .reserve(item.tier_id, item.quantity, self.config.hold_duration, owner)
            {
                Ok(hold) => {
                    acquired.push(hold.id);
                    let subtotal = tier.price * Decimal::from(item.quantity);
                    order_items.push(OrderItem {
                        tier_id: item.tier_id,
                        quantity: item.quantity,
                        unit_price: tier.price,
                        subtotal,
                        hold_id: Some(hold.id),
                    });
                }
                Err(e) => {
                    rollback(&self.ledger, &acquired);
                    return Err(e);
                }
            }
        }

        let subtotal: Decimal = order_items.iter().map(|i| i.subtotal).sum();
        let order = Order {
            id: order_id,
            buyer_id,
            // Guaranteed Some: items is non-empty and every tier agreed.
            event_id: event_id.unwrap_or_default(),
            items: order_items,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            subtotal,
            service_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: subtotal,
            payment_ref: None,
            expires_at: now + self.config.hold_duration_ms(),
            created_at: now,
            confirmed_at: None,
            cancelled_at: None,
            refunded_at: None,
            refund_reason: None,
        };
        self.orders.insert(order_id, order.clone());

        info!(%order_id, %buyer_id, total = %order.total, "order created");
        self.bus.emit(DomainEvent::OrderCreated {
            order_id,
            buyer_id,
            event_id: order.event_id,
            total: order.total,
        });
        Ok(order)
    }

    /// Creates a Pending order from an accepted waitlist offer.
    ///
    /// The offer's pre-placed hold is rebound to the new order with a fresh
    /// hold-duration TTL — the reserved units never return to the open
    /// market between acceptance and checkout.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::HoldNotFound`] / [`TicketingError::HoldExpired`]
    /// - [`TicketingError::InvalidStateTransition`] if the hold does not
    ///   back a waitlist offer
    pub fn create_order_from_offer(
        &self,
        buyer_id: BuyerId,
        hold_id: HoldId,
    ) -> Result<Order, TicketingError> {
        let now = now_millis();
        let hold = self
            .ledger
            .hold(hold_id)
            .ok_or(TicketingError::HoldNotFound { hold_id })?;

        if !matches!(hold.owner, HoldOwner::WaitlistOffer { .. }) {
            warn!(%hold_id, "checkout attempted on a non-offer hold");
            return Err(TicketingError::InvalidStateTransition {
                action: "create_order_from_offer",
                state: "hold does not back a waitlist offer".to_string(),
            });
        }

        let tier = self
            .ledger
            .tier(hold.tier_id)
            .ok_or(TicketingError::TierNotFound {
                tier_id: hold.tier_id,
            })?;

        let order_id = OrderId::new();
        let owner = HoldOwner::Order { order_id };
        let hold = self
            .ledger
            .rebind_hold(hold_id, owner, self.config.hold_duration)?;

        let subtotal = tier.price * Decimal::from(hold.quantity);
        let order = Order {
            id: order_id,
            buyer_id,
            event_id: tier.event_id,
            items: vec![OrderItem {
                tier_id: hold.tier_id,
                quantity: hold.quantity,
                unit_price: tier.price,
                subtotal,
                hold_id: Some(hold.id),
            }],
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            subtotal,
            service_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: subtotal,
            payment_ref: None,
            expires_at: hold.expires_at,
            created_at: now,
            confirmed_at: None,
            cancelled_at: None,
            refunded_at: None,
            refund_reason: None,
        };
        self.orders.insert(order_id, order.clone());

        info!(%order_id, %hold_id, "order created from waitlist offer");
        self.bus.emit(DomainEvent::OrderCreated {
            order_id,
            buyer_id,
            event_id: order.event_id,
            total: order.total,
        });
        Ok(order)
    }

    /// Confirms payment: commits every hold, mints one ticket per unit.
    ///
    /// The `payment_ref` must already be verified by the caller — this
    /// method does not charge anyone.
    ///
    /// If any hold expired before confirmation the whole order fails
    /// atomically: commits already applied are undone, remaining holds are
    /// released, the order is cancelled with `payment_status = Failed`, and
    /// [`TicketingError::HoldExpired`] is returned. The caller must refund
    /// the external charge and tell the buyer to reorder — this is never
    /// silently treated as success.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::OrderNotFound`]
    /// - [`TicketingError::InvalidStateTransition`] unless Pending
    /// - [`TicketingError::HoldExpired`]
    pub fn confirm_payment(
        &self,
        order_id: OrderId,
        payment_ref: &str,
    ) -> Result<Order, TicketingError> {
        let now = now_millis();
        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or(TicketingError::OrderNotFound { order_id })?;

        if order.status != OrderStatus::Pending {
            warn!(%order_id, status = %order.status, "confirm_payment on settled order");
            return Err(TicketingError::InvalidStateTransition {
                action: "confirm_payment",
                state: order.status.to_string(),
            });
        }

        let mut committed: Vec<(TierId, u32)> = Vec::with_capacity(order.items.len());
        let mut failure = None;
        for item in &order.items {
            let Some(hold_id) = item.hold_id else {
                continue;
            };
            match self.ledger.commit(hold_id) {
                Ok(hold) => committed.push((hold.tier_id, hold.quantity)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            // Undo partial commits and drop the surviving holds; the order
            // dies here rather than remaining Pending without backing.
            let mut freed = Vec::new();
            for (tier_id, quantity) in committed {
                if let Ok(returned) = self.ledger.release_sold(tier_id, quantity) {
                    freed.push(Freed {
                        tier_id,
                        quantity: returned,
                    });
                }
            }
            for item in &mut order.items {
                if let Some(hold_id) = item.hold_id.take()
                    && let Some(hold) = self.ledger.release(hold_id)
                {
                    freed.push(Freed {
                        tier_id: hold.tier_id,
                        quantity: hold.quantity,
                    });
                }
            }
            order.status = OrderStatus::Cancelled;
            order.payment_status = PaymentStatus::Failed;
            order.cancelled_at = Some(now);
            drop(order);

            warn!(%order_id, error = %err, "payment confirmation failed; order cancelled");
            self.bus.emit(DomainEvent::OrderCancelled { order_id });
            self.reflow.capacity_freed_batch(&freed);
            return Err(err);
        }

        order.status = OrderStatus::Confirmed;
        order.payment_status = PaymentStatus::Completed;
        order.payment_ref = Some(payment_ref.to_string());
        order.confirmed_at = Some(now);

        let mut ticket_ids = Vec::with_capacity(order.total_tickets() as usize);
        for item in &order.items {
            for _ in 0..item.quantity {
                let ticket = Ticket::mint(order_id, item.tier_id, order.event_id, order.buyer_id);
                ticket_ids.push(ticket.id);
                self.tickets.insert(ticket.id, ticket);
            }
        }
        for item in &mut order.items {
            item.hold_id = None;
        }
        let snapshot = order.clone();
        drop(order);

        info!(%order_id, tickets = ticket_ids.len(), "order confirmed");
        self.bus.emit(DomainEvent::OrderConfirmed {
            order_id,
            ticket_count: ticket_ids.len() as u32,
        });
        self.bus.emit(DomainEvent::TicketsIssued {
            order_id,
            ticket_ids,
        });
        Ok(snapshot)
    }

    /// Cancels an order.
    ///
    /// A Pending order releases its holds; a Confirmed order (admin path,
    /// pre-event only — the caller enforces the event timing) returns its
    /// sold units and invalidates its tickets. Freed capacity reflows to
    /// the waitlist either way.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::OrderNotFound`]
    /// - [`TicketingError::InvalidStateTransition`] for already-terminal
    ///   orders
    pub fn cancel(&self, order_id: OrderId) -> Result<Order, TicketingError> {
        let now = now_millis();
        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or(TicketingError::OrderNotFound { order_id })?;

        let freed = match order.status {
            OrderStatus::Pending => self.release_item_holds(&mut order),
            OrderStatus::Confirmed => self.release_item_sales(&order),
            _ => {
                warn!(%order_id, status = %order.status, "cancel on terminal order");
                return Err(TicketingError::InvalidStateTransition {
                    action: "cancel",
                    state: order.status.to_string(),
                });
            }
        };

        let was_confirmed = order.status == OrderStatus::Confirmed;
        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(now);
        for item in &mut order.items {
            item.hold_id = None;
        }
        let snapshot = order.clone();
        drop(order);

        if was_confirmed {
            self.invalidate_tickets(order_id, TicketStatus::Cancelled);
        }

        info!(%order_id, was_confirmed, "order cancelled");
        self.bus.emit(DomainEvent::OrderCancelled { order_id });
        self.reflow.capacity_freed_batch(&freed);
        Ok(snapshot)
    }

    /// Refunds a Confirmed order: sold units return to capacity, tickets
    /// are invalidated, and the freed units reflow to the waitlist.
    ///
    /// The external payment refund is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::OrderNotFound`]
    /// - [`TicketingError::InvalidStateTransition`] unless Confirmed
    pub fn refund(&self, order_id: OrderId, reason: &str) -> Result<Order, TicketingError> {
        let now = now_millis();
        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or(TicketingError::OrderNotFound { order_id })?;

        if order.status != OrderStatus::Confirmed {
            warn!(%order_id, status = %order.status, "refund on non-confirmed order");
            return Err(TicketingError::InvalidStateTransition {
                action: "refund",
                state: order.status.to_string(),
            });
        }

        let freed = self.release_item_sales(&order);
        order.status = OrderStatus::Refunded;
        order.payment_status = PaymentStatus::Refunded;
        order.refunded_at = Some(now);
        order.refund_reason = Some(reason.to_string());
        let snapshot = order.clone();
        drop(order);

        self.invalidate_tickets(order_id, TicketStatus::Refunded);

        info!(%order_id, reason, "order refunded");
        self.bus.emit(DomainEvent::OrderRefunded { order_id });
        self.reflow.capacity_freed_batch(&freed);
        Ok(snapshot)
    }

    /// Cancels every Pending order whose deadline has passed at `now`.
    ///
    /// Returns the number of orders expired. Racing an explicit cancel is
    /// safe: both paths drive to Cancelled and hold release is idempotent.
    pub fn expire_due_at(&self, now: u64) -> usize {
        let due: Vec<OrderId> = self
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending && now > o.expires_at)
            .map(|o| o.id)
            .collect();

        let mut expired = 0;
        for order_id in due {
            let Some(mut order) = self.orders.get_mut(&order_id) else {
                continue;
            };
            // Re-check under the entry lock; a confirm or cancel may have won.
            if order.status != OrderStatus::Pending || now <= order.expires_at {
                continue;
            }

            let freed = self.release_item_holds(&mut order);
            order.status = OrderStatus::Cancelled;
            order.cancelled_at = Some(now);
            drop(order);

            expired += 1;
            info!(%order_id, "pending order expired");
            self.bus.emit(DomainEvent::OrderExpired { order_id });
            self.reflow.capacity_freed_batch(&freed);
        }
        expired
    }

    /// Cancels overdue Pending orders using the wall clock.
    pub fn expire_due(&self) -> usize {
        self.expire_due_at(now_millis())
    }

    /// Returns a snapshot of an order.
    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.orders.get(&order_id).map(|o| o.clone())
    }

    /// Returns a snapshot of a ticket.
    #[must_use]
    pub fn ticket(&self, ticket_id: TicketId) -> Option<Ticket> {
        self.tickets.get(&ticket_id).map(|t| t.clone())
    }

    /// All tickets minted for an order.
    #[must_use]
    pub fn tickets_for_order(&self, order_id: OrderId) -> Vec<Ticket> {
        self.tickets
            .iter()
            .filter(|t| t.order_id == order_id)
            .map(|t| t.clone())
            .collect()
    }

    /// Assigns attendee details to a ticket.
    ///
    /// Allowed until the ticket is Used.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::InvalidStateTransition`] once checked in or
    ///   invalidated; `EntryNotFound` is not used here — an unknown ticket
    ///   reports `InvalidStateTransition` with state `"missing"`.
    pub fn set_attendee(
        &self,
        ticket_id: TicketId,
        name: &str,
        email: &str,
    ) -> Result<Ticket, TicketingError> {
        let mut ticket = self.tickets.get_mut(&ticket_id).ok_or_else(|| {
            TicketingError::InvalidStateTransition {
                action: "set_attendee",
                state: "missing".to_string(),
            }
        })?;

        if !ticket.can_check_in() {
            return Err(TicketingError::InvalidStateTransition {
                action: "set_attendee",
                state: format!("{:?}", ticket.status).to_lowercase(),
            });
        }

        ticket.attendee_name = Some(name.to_string());
        ticket.attendee_email = Some(email.to_string());
        Ok(ticket.clone())
    }

    /// Checks a ticket in: Valid → Used.
    ///
    /// # Errors
    ///
    /// [`TicketingError::InvalidStateTransition`] for anything but a Valid,
    /// not-yet-used ticket.
    pub fn check_in(&self, ticket_id: TicketId) -> Result<Ticket, TicketingError> {
        let mut ticket = self.tickets.get_mut(&ticket_id).ok_or_else(|| {
            TicketingError::InvalidStateTransition {
                action: "check_in",
                state: "missing".to_string(),
            }
        })?;

        if !ticket.can_check_in() {
            warn!(%ticket_id, status = ?ticket.status, "check_in rejected");
            return Err(TicketingError::InvalidStateTransition {
                action: "check_in",
                state: format!("{:?}", ticket.status).to_lowercase(),
            });
        }

        ticket.status = TicketStatus::Used;
        ticket.checked_in_at = Some(now_millis());
        info!(%ticket_id, "ticket checked in");
        Ok(ticket.clone())
    }

    /// Releases the holds of a Pending order's items.
    fn release_item_holds(&self, order: &mut Order) -> Vec<Freed> {
        let mut freed = Vec::new();
        for item in &mut order.items {
            if let Some(hold_id) = item.hold_id.take()
                && let Some(hold) = self.ledger.release(hold_id)
            {
                freed.push(Freed {
                    tier_id: hold.tier_id,
                    quantity: hold.quantity,
                });
            }
        }
        freed
    }

    /// Returns the sold units of a Confirmed order's items.
    fn release_item_sales(&self, order: &Order) -> Vec<Freed> {
        let mut freed = Vec::new();
        for item in &order.items {
            if let Ok(returned) = self.ledger.release_sold(item.tier_id, item.quantity)
                && returned > 0
            {
                freed.push(Freed {
                    tier_id: item.tier_id,
                    quantity: returned,
                });
            }
        }
        freed
    }

    /// Marks every Valid ticket of an order with the given terminal status.
    fn invalidate_tickets(&self, order_id: OrderId, status: TicketStatus) {
        for mut ticket in self.tickets.iter_mut() {
            if ticket.order_id == order_id && ticket.status == TicketStatus::Valid {
                ticket.status = status;
            }
        }
    }
}
