/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Background expiry sweep.

use super::coordinator::ReflowCoordinator;
use crate::clock::now_millis;
use crate::config::TicketingConfig;
use crate::inventory::InventoryLedger;
use crate::orders::OrderLifecycle;
use crate::waitlist::WaitlistQueue;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Counters reported by one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Holds released because their deadline passed.
    pub holds_expired: usize,
    /// Pending orders transitioned to Cancelled.
    pub orders_expired: usize,
    /// Waitlist offers withdrawn for lack of response.
    pub offers_expired: usize,
}

impl SweepStats {
    /// Returns `true` if the pass reclaimed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holds_expired == 0 && self.orders_expired == 0 && self.offers_expired == 0
    }
}

/// Periodic task that reclaims every overdue deadline in the system.
///
/// Each tick releases expired holds (reflowing their capacity), cancels
/// overdue Pending orders, and withdraws lapsed waitlist offers. The sweep
/// interval is configuration, independent of request traffic.
///
/// # Examples
///
/// ```no_run
/// use ticketing_rs::TicketingCore;
/// use tokio::sync::watch;
///
/// # async fn example() {
/// let core = TicketingCore::new(Default::default());
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = core.sweeper(shutdown_rx).spawn();
/// // ... serve traffic ...
/// shutdown_tx.send(true).ok();
/// handle.wait().await.ok();
/// # }
/// ```
pub struct ExpirySweeper {
    ledger: Arc<InventoryLedger>,
    orders: Arc<OrderLifecycle>,
    waitlist: Arc<WaitlistQueue>,
    reflow: Arc<ReflowCoordinator>,
    config: TicketingConfig,
    shutdown_rx: watch::Receiver<bool>,
}

impl ExpirySweeper {
    /// Creates a sweeper over the given components.
    #[must_use]
    pub fn new(
        ledger: Arc<InventoryLedger>,
        orders: Arc<OrderLifecycle>,
        waitlist: Arc<WaitlistQueue>,
        reflow: Arc<ReflowCoordinator>,
        config: TicketingConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            ledger,
            orders,
            waitlist,
            reflow,
            config,
            shutdown_rx,
        }
    }

    /// Runs one sweep pass at `now`.
    ///
    /// Order matters: holds are reclaimed first so their capacity reflows
    /// immediately, then overdue orders (whose holds are already gone — the
    /// idempotent release makes the second pass a no-op), then waitlist
    /// offers, which cascade internally.
    pub fn sweep_once_at(&self, now: u64) -> SweepStats {
        let expired_holds = self.ledger.expire_due_at(now);
        let holds_expired = expired_holds.len();
        for hold in expired_holds {
            self.reflow.capacity_freed(hold.tier_id, hold.quantity);
        }

        let orders_expired = self.orders.expire_due_at(now);
        let offers_expired = self.waitlist.expire_due_at(now);

        let stats = SweepStats {
            holds_expired,
            orders_expired,
            offers_expired,
        };
        if !stats.is_empty() {
            debug!(?stats, "sweep pass reclaimed deadlines");
        }
        stats
    }

    /// Runs one sweep pass using the wall clock.
    pub fn sweep_once(&self) -> SweepStats {
        self.sweep_once_at(now_millis())
    }

    /// Runs the sweep loop until shutdown is signalled.
    pub async fn run(mut self) {
        info!(interval = ?self.config.sweep_interval, "expiry sweeper started");
        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("expiry sweeper received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    self.sweep_once();
                }
            }
        }

        info!("expiry sweeper shutdown complete");
    }

    /// Spawns the sweep loop on a new task.
    #[must_use]
    pub fn spawn(self) -> SweeperHandle {
        let handle = tokio::spawn(self.run());
        SweeperHandle { handle }
    }
}

/// Handle to a spawned sweeper task.
pub struct SweeperHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Waits for the sweeper to shut down.
    pub async fn wait(self) -> Result<(), tokio::task::JoinError> {
        self.handle.await
    }
}
