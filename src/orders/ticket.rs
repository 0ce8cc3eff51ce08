/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Individual tickets minted at order confirmation.

use crate::ids::{BuyerId, EventId, OrderId, TicketId, TierId};
use serde::{Deserialize, Serialize};

/// Validity state of an issued ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Usable for entry.
    Valid,
    /// Checked in at the venue.
    Used,
    /// Invalidated by order cancellation.
    Cancelled,
    /// Invalidated by refund.
    Refunded,
}

/// One admission unit, minted only when its order is confirmed.
///
/// Attendee fields stay mutable until the ticket is Used, so buyers can
/// assign tickets to companions after purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Human-enterable code printed on the ticket.
    pub ticket_code: String,
    /// The order this ticket belongs to.
    pub order_id: OrderId,
    /// The tier this ticket admits to.
    pub tier_id: TierId,
    /// The event this ticket admits to.
    pub event_id: EventId,
    /// The purchasing buyer.
    pub buyer_id: BuyerId,
    /// Validity state.
    pub status: TicketStatus,
    /// Attendee name, settable until the ticket is Used.
    pub attendee_name: Option<String>,
    /// Attendee email, settable until the ticket is Used.
    pub attendee_email: Option<String>,
    /// Check-in time (ms), set when the ticket becomes Used.
    pub checked_in_at: Option<u64>,
}

impl Ticket {
    /// Mints a Valid ticket for a confirmed order item.
    #[must_use]
    pub fn mint(order_id: OrderId, tier_id: TierId, event_id: EventId, buyer_id: BuyerId) -> Self {
        let id = TicketId::new();
        let ticket_code = Self::code_for(&id);
        Self {
            id,
            ticket_code,
            order_id,
            tier_id,
            event_id,
            buyer_id,
            status: TicketStatus::Valid,
            attendee_name: None,
            attendee_email: None,
            checked_in_at: None,
        }
    }

    /// Returns `true` if the ticket can still be checked in.
    #[inline]
    #[must_use]
    pub fn can_check_in(&self) -> bool {
        self.status == TicketStatus::Valid && self.checked_in_at.is_none()
    }

    fn code_for(id: &TicketId) -> String {
        let hex = id.as_uuid().simple().to_string();
        format!("TKT-{}", hex[..12].to_uppercase())
    }
}
