/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Tests for the oversell guard under concurrent reservation pressure.

#[cfg(test)]
mod tests {
    use crate::events::EventBus;
    use crate::ids::{EventId, OrderId};
    use crate::inventory::{HoldOwner, InventoryLedger, TicketTier};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_concurrent_reserves_never_oversell() {
        let ledger = Arc::new(InventoryLedger::new(EventBus::new()));
        let tier = TicketTier::new(EventId::new(), "Flash Sale", Decimal::new(5000, 2), 50);
        let tier_id = ledger.add_tier(tier);

        let granted = Arc::new(AtomicU32::new(0));
        let rejected = Arc::new(AtomicU32::new(0));

        // 40 buyers racing for 2 units each against capacity 50: at most 25
        // reservations can succeed.
        let mut handles = Vec::new();
        for _ in 0..40 {
            let ledger = ledger.clone();
            let granted = granted.clone();
            let rejected = rejected.clone();
            handles.push(std::thread::spawn(move || {
                let owner = HoldOwner::Order {
                    order_id: OrderId::new(),
                };
                match ledger.reserve(tier_id, 2, TTL, owner) {
                    Ok(_) => granted.fetch_add(2, Ordering::SeqCst),
                    Err(e) => {
                        assert!(e.is_sold_out(), "unexpected error: {e}");
                        rejected.fetch_add(2, Ordering::SeqCst)
                    }
                };
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let tier = ledger.tier(tier_id).unwrap();
        assert_eq!(granted.load(Ordering::SeqCst), 50);
        assert_eq!(rejected.load(Ordering::SeqCst), 30);
        assert_eq!(tier.held, 50);
        assert!(tier.sold + tier.held <= tier.capacity);
    }

    #[test]
    fn test_concurrent_mixed_operations_hold_invariant() {
        let ledger = Arc::new(InventoryLedger::new(EventBus::new()));
        let tier = TicketTier::new(EventId::new(), "GA", Decimal::ONE, 100);
        let tier_id = ledger.add_tier(tier);

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                let owner = HoldOwner::Order {
                    order_id: OrderId::new(),
                };
                for _ in 0..10 {
                    if let Ok(hold) = ledger.reserve(tier_id, 3, TTL, owner) {
                        if i % 2 == 0 {
                            ledger.commit(hold.id).ok();
                        } else {
                            ledger.release(hold.id);
                        }
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let tier = ledger.tier(tier_id).unwrap();
        assert!(tier.sold + tier.held <= tier.capacity);
        // Releasers returned everything; only committers consumed capacity.
        assert_eq!(tier.held, 0);
        assert_eq!(tier.sold % 3, 0);
    }

    #[test]
    fn test_concurrent_double_release_counts_once() {
        let ledger = Arc::new(InventoryLedger::new(EventBus::new()));
        let tier = TicketTier::new(EventId::new(), "GA", Decimal::ONE, 10);
        let tier_id = ledger.add_tier(tier);
        let owner = HoldOwner::Order {
            order_id: OrderId::new(),
        };
        let hold = ledger.reserve(tier_id, 4, TTL, owner).unwrap();

        let mut handles = Vec::new();
        let released = Arc::new(AtomicU32::new(0));
        for _ in 0..8 {
            let ledger = ledger.clone();
            let released = released.clone();
            handles.push(std::thread::spawn(move || {
                if ledger.release(hold.id).is_some() {
                    released.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Exactly one racer wins the release; held drops by 4 exactly once.
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.tier(tier_id).unwrap().held, 0);
        assert_eq!(ledger.tier(tier_id).unwrap().available(), 10);
    }
}
