use rust_decimal::Decimal;
use std::sync::Arc;
use ticketing_rs::TicketingCore;
use ticketing_rs::events::DomainEvent;
use ticketing_rs::ids::BuyerId;
use ticketing_rs::ids::EventId;
use ticketing_rs::inventory::TicketTier;
use ticketing_rs::orders::{NewOrderItem, OrderStatus};
use ticketing_rs::waitlist::WaitlistStatus;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: u32) -> (Arc<TicketingCore>, EventId, ticketing_rs::ids::TierId) {
        let core = Arc::new(TicketingCore::new(Default::default()));
        let event_id = EventId::new();
        let tier_id = core.ledger.add_tier(TicketTier::new(
            event_id,
            "General Admission",
            Decimal::new(4500, 2),
            capacity,
        ));
        (core, event_id, tier_id)
    }

    // --- flash sale ---

    #[test]
    fn test_flash_sale_never_oversells() {
        let (core, _, tier_id) = setup(50);

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let core = Arc::clone(&core);
                std::thread::spawn(move || {
                    core.orders
                        .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 2 }])
                        .is_ok()
                })
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|h| h.join().expect("buyer thread panicked"))
            .filter(|&granted| granted)
            .count();

        // 40 buyers want 80 units of 50: exactly 25 orders fit.
        assert_eq!(granted, 25);
        let tier = core.ledger.tier(tier_id).unwrap();
        assert_eq!(tier.held, 50);
        assert_eq!(tier.sold, 0);
        assert_eq!(tier.available(), 0);
    }

    #[test]
    fn test_flash_sale_confirm_all_winners() {
        let (core, _, tier_id) = setup(20);

        let orders: Vec<_> = (0..10)
            .map(|_| {
                core.orders
                    .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 2 }])
                    .unwrap()
            })
            .collect();

        for order in &orders {
            core.orders.confirm_payment(order.id, "pi_flash").unwrap();
        }

        let tier = core.ledger.tier(tier_id).unwrap();
        assert_eq!(tier.sold, 20);
        assert_eq!(tier.held, 0);
        let total_tickets: usize = orders
            .iter()
            .map(|o| core.orders.tickets_for_order(o.id).len())
            .sum();
        assert_eq!(total_tickets, 20);
    }

    // --- sellout, waitlist, reflow ---

    #[test]
    fn test_sellout_waitlist_and_reflow_chain() {
        let (core, event_id, tier_id) = setup(2);

        // Sell out.
        let winner = core
            .orders
            .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 2 }])
            .unwrap();
        core.orders.confirm_payment(winner.id, "pi_1").unwrap();
        assert!(
            core.orders
                .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 1 }])
                .unwrap_err()
                .is_sold_out()
        );

        // Three buyers queue up.
        let first_buyer = BuyerId::new();
        let first = core.waitlist.join(event_id, Some(tier_id), first_buyer).unwrap();
        let second = core
            .waitlist
            .join(event_id, Some(tier_id), BuyerId::new())
            .unwrap();
        let third = core
            .waitlist
            .join(event_id, Some(tier_id), BuyerId::new())
            .unwrap();

        // A refund frees both units: offers land on the first two in line.
        core.orders.refund(winner.id, "can no longer attend").unwrap();
        assert_eq!(
            core.waitlist.entry(first.id).unwrap().status,
            WaitlistStatus::Notified
        );
        assert_eq!(
            core.waitlist.entry(second.id).unwrap().status,
            WaitlistStatus::Notified
        );
        assert_eq!(
            core.waitlist.entry(third.id).unwrap().status,
            WaitlistStatus::Waiting
        );

        // Second declines: the unit cascades to the third.
        core.waitlist.respond(second.id, false).unwrap();
        assert_eq!(
            core.waitlist.entry(third.id).unwrap().status,
            WaitlistStatus::Notified
        );

        // First accepts and checks out end to end.
        let first = core.waitlist.respond(first.id, true).unwrap();
        let order = core
            .orders
            .create_order_from_offer(first_buyer, first.hold_id.unwrap())
            .unwrap();
        let confirmed = core.orders.confirm_payment(order.id, "pi_2").unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let tier = core.ledger.tier(tier_id).unwrap();
        assert_eq!(tier.sold, 1);
        assert_eq!(tier.held, 1); // third's outstanding offer
        assert_eq!(tier.available(), 0);
    }

    // --- domain events ---

    #[test]
    fn test_purchase_flow_emits_events_in_order() {
        let (core, _, tier_id) = setup(5);
        let mut rx = core.subscribe();

        let order = core
            .orders
            .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 2 }])
            .unwrap();
        core.orders.confirm_payment(order.id, "pi_events").unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                DomainEvent::HoldPlaced { .. } => "hold_placed",
                DomainEvent::OrderCreated { .. } => "order_created",
                DomainEvent::OrderConfirmed { .. } => "order_confirmed",
                DomainEvent::TicketsIssued { .. } => "tickets_issued",
                _ => "other",
            });
        }
        assert_eq!(
            kinds,
            vec![
                "hold_placed",
                "order_created",
                "order_confirmed",
                "tickets_issued"
            ]
        );
    }

    // --- multi-tier events ---

    #[test]
    fn test_tiers_listed_in_display_order() {
        let core = TicketingCore::new(Default::default());
        let event_id = EventId::new();

        let mut vip = TicketTier::new(event_id, "VIP", Decimal::new(19900, 2), 20);
        vip.position = 0;
        let mut ga = TicketTier::new(event_id, "General Admission", Decimal::new(4500, 2), 200);
        ga.position = 1;
        let mut lawn = TicketTier::new(event_id, "Lawn", Decimal::new(2500, 2), 500);
        lawn.position = 2;

        // Insert out of order.
        core.ledger.add_tier(lawn);
        core.ledger.add_tier(vip);
        core.ledger.add_tier(ga);

        let names: Vec<String> = core
            .ledger
            .tiers_for_event(event_id)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["VIP", "General Admission", "Lawn"]);
    }

    #[test]
    fn test_cross_tier_order_within_one_event() {
        let core = TicketingCore::new(Default::default());
        let event_id = EventId::new();
        let vip = core
            .ledger
            .add_tier(TicketTier::new(event_id, "VIP", Decimal::new(19900, 2), 10));
        let ga = core
            .ledger
            .add_tier(TicketTier::new(event_id, "GA", Decimal::new(4500, 2), 100));

        let order = core
            .orders
            .create_order(
                BuyerId::new(),
                &[
                    NewOrderItem {
                        tier_id: vip,
                        quantity: 1,
                    },
                    NewOrderItem {
                        tier_id: ga,
                        quantity: 3,
                    },
                ],
            )
            .unwrap();
        assert_eq!(order.subtotal, Decimal::new(19900 + 3 * 4500, 2));

        core.orders.confirm_payment(order.id, "pi_mixed").unwrap();
        assert_eq!(core.ledger.tier(vip).unwrap().sold, 1);
        assert_eq!(core.ledger.tier(ga).unwrap().sold, 3);
        assert_eq!(core.orders.tickets_for_order(order.id).len(), 4);
    }
}
