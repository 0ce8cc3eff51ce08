/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Order lifecycle: the state machine between reservation and ticket.
//!
//! An order is born Pending with a backing hold per item, and ends in
//! exactly one of Confirmed, Cancelled, or Refunded. Tickets exist only for
//! confirmed orders — a Pending order never leaks valid-looking tickets for
//! unpaid inventory.
//!
//! # State machine
//!
//! | From      | Event                   | To        |
//! |-----------|-------------------------|-----------|
//! | —         | `create_order`          | Pending   |
//! | Pending   | `confirm_payment`       | Confirmed |
//! | Pending   | expiry / `cancel`       | Cancelled |
//! | Confirmed | `cancel` (admin)        | Cancelled |
//! | Confirmed | `refund`                | Refunded  |
//!
//! Every inventory-freeing transition routes the freed units through the
//! [`ReflowCoordinator`] so the waitlist can consume them.
//!
//! [`ReflowCoordinator`]: crate::reflow::ReflowCoordinator

pub mod lifecycle;
pub mod order;
pub mod ticket;

#[cfg(test)]
mod tests;

pub use lifecycle::{NewOrderItem, OrderLifecycle};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use ticket::{Ticket, TicketStatus};
