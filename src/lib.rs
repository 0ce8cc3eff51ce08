/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! # ticketing-rs
//!
//! A concurrent, in-memory ticket vending core. The crate manages fixed
//! per-tier capacity under concurrent purchase traffic without overselling,
//! drives orders through a Pending → Confirmed/Cancelled/Refunded state
//! machine, and reflows freed capacity to a fairness-ordered waitlist.
//!
//! # Architecture
//!
//! - [`inventory::InventoryLedger`] — per-tier `(capacity, sold, held)`
//!   counters plus the hold registry; every reservation is an atomic
//!   check-and-increment under the tier's entry lock
//! - [`orders::OrderLifecycle`] — the order state machine and ticket
//!   registry; creation is all-or-nothing across items
//! - [`waitlist::WaitlistQueue`] — FIFO buckets per `(event, tier)` with
//!   time-boxed offers placed hold-first
//! - [`reflow::ReflowCoordinator`] — stateless glue routing every freed
//!   unit into a waitlist offer pass
//! - [`reflow::ExpirySweeper`] — background task reclaiming overdue holds,
//!   Pending orders, and lapsed offers on a fixed cadence
//! - [`events::EventBus`] — broadcast stream of [`events::DomainEvent`]
//!   values emitted by every transition
//!
//! All deadlines are absolute milliseconds since the Unix epoch; components
//! expose `_at(now)` variants so tests never sleep.
//!
//! # Examples
//!
//! ```
//! use rust_decimal::Decimal;
//! use ticketing_rs::TicketingCore;
//! use ticketing_rs::ids::{BuyerId, EventId};
//! use ticketing_rs::inventory::TicketTier;
//! use ticketing_rs::orders::NewOrderItem;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let core = TicketingCore::new(Default::default());
//!
//! let event_id = EventId::new();
//! let tier_id = core
//!     .ledger
//!     .add_tier(TicketTier::new(event_id, "VIP", Decimal::new(9900, 2), 50));
//!
//! let order = core.orders.create_order(
//!     BuyerId::new(),
//!     &[NewOrderItem { tier_id, quantity: 2 }],
//! )?;
//! let confirmed = core.orders.confirm_payment(order.id, "pi_3NxT2")?;
//!
//! assert!(confirmed.is_confirmed());
//! assert_eq!(core.orders.tickets_for_order(order.id).len(), 2);
//! assert_eq!(core.ledger.available(tier_id), Some(48));
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod ids;
pub mod inventory;
pub mod orders;
pub mod reflow;
pub mod waitlist;

pub use self::config::TicketingConfig;
pub use self::core::TicketingCore;
pub use self::errors::TicketingError;
