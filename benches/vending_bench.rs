use criterion::{BatchSize, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::hint::black_box;
use std::time::Duration;
use ticketing_rs::TicketingCore;
use ticketing_rs::events::EventBus;
use ticketing_rs::ids::{BuyerId, EventId, OrderId, TierId};
use ticketing_rs::inventory::{HoldOwner, InventoryLedger, TicketTier};
use ticketing_rs::orders::NewOrderItem;

const TTL: Duration = Duration::from_secs(300);

fn order_owner() -> HoldOwner {
    HoldOwner::Order {
        order_id: OrderId::new(),
    }
}

fn ledger_with_tier(capacity: u32) -> (InventoryLedger, TierId) {
    let ledger = InventoryLedger::new(EventBus::new());
    let tier = TicketTier::new(EventId::new(), "GA", Decimal::new(4500, 2), capacity);
    let tier_id = ledger.add_tier(tier);
    (ledger, tier_id)
}

pub fn bench_reserve_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("reserve_release");
    let (ledger, tier_id) = ledger_with_tier(u32::MAX);

    group.bench_function("reserve_then_release", |b| {
        b.iter(|| {
            let hold = ledger
                .reserve(black_box(tier_id), 2, TTL, order_owner())
                .unwrap();
            black_box(ledger.release(hold.id));
        });
    });

    group.bench_function("reserve_then_commit", |b| {
        b.iter(|| {
            let hold = ledger
                .reserve(black_box(tier_id), 2, TTL, order_owner())
                .unwrap();
            black_box(ledger.commit(hold.id).unwrap());
        });
    });

    group.finish();
}

pub fn bench_order_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_flow");
    let core = TicketingCore::new(Default::default());
    let tier_id = core.ledger.add_tier(TicketTier::new(
        EventId::new(),
        "GA",
        Decimal::new(4500, 2),
        u32::MAX,
    ));

    group.bench_function("create_confirm", |b| {
        b.iter(|| {
            let order = core
                .orders
                .create_order(BuyerId::new(), &[NewOrderItem { tier_id, quantity: 2 }])
                .unwrap();
            black_box(core.orders.confirm_payment(order.id, "pi_bench").unwrap());
        });
    });

    group.finish();
}

pub fn bench_expiry_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("expiry_sweep");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("expire_due", size), &size, |b, &n| {
            b.iter_batched(
                || {
                    let (ledger, tier_id) = ledger_with_tier(u32::MAX);
                    for _ in 0..n {
                        ledger
                            .reserve(tier_id, 1, Duration::ZERO, order_owner())
                            .unwrap();
                    }
                    ledger
                },
                |ledger| {
                    let released = ledger.expire_due_at(u64::MAX);
                    black_box(released)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_reserve_release(c);
    bench_order_flow(c);
    bench_expiry_sweep(c);
}
