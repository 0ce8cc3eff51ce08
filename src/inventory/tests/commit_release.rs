/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Tests for the commit/release half of the hold protocol.

#[cfg(test)]
mod tests {
    use crate::clock::now_millis;
    use crate::errors::TicketingError;
    use crate::events::EventBus;
    use crate::ids::{EventId, HoldId, OrderId, TierId};
    use crate::inventory::{HoldOwner, InventoryLedger, TicketTier};
    use rust_decimal::Decimal;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(300);

    fn order_owner() -> HoldOwner {
        HoldOwner::Order {
            order_id: OrderId::new(),
        }
    }

    fn ledger_with_tier(capacity: u32) -> (InventoryLedger, TierId) {
        let ledger = InventoryLedger::new(EventBus::new());
        let tier = TicketTier::new(EventId::new(), "GA", Decimal::new(2500, 2), capacity);
        let tier_id = ledger.add_tier(tier);
        (ledger, tier_id)
    }

    #[test]
    fn test_commit_moves_held_to_sold() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger.reserve(tier_id, 5, TTL, order_owner()).unwrap();

        ledger.commit(hold.id).unwrap();

        let tier = ledger.tier(tier_id).unwrap();
        assert_eq!(tier.sold, 5);
        assert_eq!(tier.held, 0);
        assert_eq!(tier.available(), 5);
        assert_eq!(ledger.hold(hold.id), None);
    }

    #[test]
    fn test_commit_unknown_hold_fails() {
        let (ledger, _) = ledger_with_tier(10);
        let hold_id = HoldId::new();
        assert_eq!(
            ledger.commit(hold_id).unwrap_err(),
            TicketingError::HoldNotFound { hold_id }
        );
    }

    #[test]
    fn test_commit_expired_hold_fails_and_releases() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger
            .reserve(tier_id, 3, Duration::ZERO, order_owner())
            .unwrap();

        // Zero TTL: the deadline is already in the past.
        std::thread::sleep(Duration::from_millis(5));
        let err = ledger.commit(hold.id).unwrap_err();
        assert!(err.is_hold_expired());

        // The expired hold was reclaimed, not left dangling.
        let tier = ledger.tier(tier_id).unwrap();
        assert_eq!(tier.held, 0);
        assert_eq!(tier.sold, 0);
        assert_eq!(ledger.hold(hold.id), None);
    }

    #[test]
    fn test_release_is_idempotent() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger.reserve(tier_id, 4, TTL, order_owner()).unwrap();

        let first = ledger.release(hold.id);
        assert_eq!(first.map(|h| h.quantity), Some(4));
        assert_eq!(ledger.tier(tier_id).unwrap().held, 0);

        // Second release is a no-op, not an error.
        assert_eq!(ledger.release(hold.id), None);
        assert_eq!(ledger.tier(tier_id).unwrap().held, 0);
    }

    #[test]
    fn test_commit_after_release_fails() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger.reserve(tier_id, 2, TTL, order_owner()).unwrap();
        ledger.release(hold.id);

        assert_eq!(
            ledger.commit(hold.id).unwrap_err(),
            TicketingError::HoldNotFound { hold_id: hold.id }
        );
        assert_eq!(ledger.tier(tier_id).unwrap().available(), 10);
    }

    #[test]
    fn test_release_sold_returns_units() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger.reserve(tier_id, 6, TTL, order_owner()).unwrap();
        ledger.commit(hold.id).unwrap();

        let freed = ledger.release_sold(tier_id, 4).unwrap();
        assert_eq!(freed, 4);

        let tier = ledger.tier(tier_id).unwrap();
        assert_eq!(tier.sold, 2);
        assert_eq!(tier.available(), 8);
    }

    #[test]
    fn test_release_sold_never_goes_negative() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let hold = ledger.reserve(tier_id, 2, TTL, order_owner()).unwrap();
        ledger.commit(hold.id).unwrap();

        let freed = ledger.release_sold(tier_id, 5).unwrap();
        assert_eq!(freed, 2);
        assert_eq!(ledger.tier(tier_id).unwrap().sold, 0);
    }

    #[test]
    fn test_expire_due_reclaims_only_past_deadline() {
        let (ledger, tier_id) = ledger_with_tier(10);
        let short = ledger
            .reserve(tier_id, 2, Duration::from_millis(10), order_owner())
            .unwrap();
        let long = ledger.reserve(tier_id, 3, TTL, order_owner()).unwrap();

        let now = now_millis() + 1_000;
        let released = ledger.expire_due_at(now);

        assert_eq!(released.len(), 1);
        assert_eq!(released[0].id, short.id);

        let tier = ledger.tier(tier_id).unwrap();
        assert_eq!(tier.held, 3);
        assert!(ledger.hold(long.id).is_some());
    }

    #[test]
    fn test_expire_due_is_safe_to_repeat() {
        let (ledger, tier_id) = ledger_with_tier(10);
        ledger
            .reserve(tier_id, 2, Duration::ZERO, order_owner())
            .unwrap();

        let far_future = now_millis() + 60_000;
        assert_eq!(ledger.expire_due_at(far_future).len(), 1);
        assert_eq!(ledger.expire_due_at(far_future).len(), 0);
        assert_eq!(ledger.tier(tier_id).unwrap().held, 0);
    }
}
