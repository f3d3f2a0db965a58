//! Async tick driver: a fixed-period loop, woken early when a peer writes
//! to the store.
//!
//! The early wake-up is a latency optimization only; convergence rests on
//! the periodic tick, so the driver degrades cleanly when the store cannot
//! deliver change notifications.

use std::time::Duration;

use mosaic_store::WatchHandle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::policy::RegistryPolicy;
use crate::registry::SharedRegistry;

pub struct TickerHandle {
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl TickerHandle {
    /// Stop the loop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawn the recurring tick loop for a registry. Each window context runs
/// exactly one of these; tearing a context down stops only its own loop,
/// peers find out through the sweeper.
pub fn spawn_ticker(registry: SharedRegistry) -> TickerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (change_tx, change_rx) = mpsc::channel::<()>(16);

    let (period, watch_handle) = match registry.lock() {
        Ok(guard) => {
            let handle = guard
                .watch_store(Box::new(move || {
                    let _ = change_tx.try_send(());
                }))
                .map_err(|e| {
                    warn!("store change watch unavailable, relying on periodic ticks: {e}")
                })
                .ok();
            (guard.policy().tick_period, handle)
        }
        Err(_) => (RegistryPolicy::default().tick_period, None),
    };

    let task = tokio::spawn(run_loop(registry, period, watch_handle, change_rx, shutdown_rx));
    TickerHandle {
        task,
        shutdown: shutdown_tx,
    }
}

async fn run_loop(
    registry: SharedRegistry,
    period: Duration,
    watch_handle: Option<WatchHandle>,
    mut changes: mpsc::Receiver<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    // Holding the subscription keeps change notifications flowing for the
    // lifetime of the loop.
    let _watch_handle = watch_handle;
    let mut changes_open = true;

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = changes.recv(), if changes_open => {
                match changed {
                    Some(()) => {
                        // Coalesce a burst of peer writes into one reconcile.
                        while changes.try_recv().is_ok() {}
                    }
                    None => {
                        changes_open = false;
                        continue;
                    }
                }
            }
            result = shutdown.changed() => {
                // A dropped handle counts as shutdown.
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        match registry.lock() {
            Ok(mut guard) => guard.tick(),
            Err(_) => {
                warn!("registry lock poisoned, stopping ticker");
                break;
            }
        }
    }
    debug!("ticker stopped");
}
