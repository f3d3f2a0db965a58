//! The Registry owns the local window's record, publishes it to the shared
//! store, reconciles the global set each tick, and fires the two consumer
//! callbacks.

use std::sync::{Arc, Mutex};

use mosaic_common::{Clock, Rect, StoreError, SystemClock, WindowId, WindowRecord};
use mosaic_store::{ChangeCallback, SharedStore, WatchHandle};
use tracing::{debug, info, warn};

use crate::policy::RegistryPolicy;
use crate::snapshot::Snapshot;
use crate::sweeper::LivenessSweeper;

/// Reports the local window's current shape. In a browser context this
/// reads the window's screen position and inner size; the demo app backs
/// it with simulated movement.
pub trait ShapeSource: Send {
    fn current_shape(&self) -> Rect;
}

impl<F> ShapeSource for F
where
    F: Fn() -> Rect + Send,
{
    fn current_shape(&self) -> Rect {
        self()
    }
}

pub type ShapeHandler = Box<dyn FnMut(Rect) + Send>;
pub type WindowsHandler = Box<dyn FnMut(&[WindowRecord]) + Send>;

/// A registry shared between a consumer and its tick driver.
pub type SharedRegistry = Arc<Mutex<Registry>>;

pub struct Registry {
    store: Box<dyn SharedStore>,
    shape_source: Box<dyn ShapeSource>,
    clock: Arc<dyn Clock>,
    policy: RegistryPolicy,
    sweeper: LivenessSweeper,
    local: Option<WindowRecord>,
    snapshot: Snapshot,
    shape_handler: Option<ShapeHandler>,
    windows_handler: Option<WindowsHandler>,
    store_down: bool,
}

impl Registry {
    pub fn new(
        store: Box<dyn SharedStore>,
        shape_source: Box<dyn ShapeSource>,
        clock: Arc<dyn Clock>,
        policy: RegistryPolicy,
    ) -> Self {
        Self {
            store,
            shape_source,
            clock,
            policy,
            sweeper: LivenessSweeper::new(policy.staleness_threshold),
            local: None,
            snapshot: Snapshot::default(),
            shape_handler: None,
            windows_handler: None,
            store_down: false,
        }
    }

    /// Wall clock and default timing policy.
    pub fn with_defaults(store: Box<dyn SharedStore>, shape_source: Box<dyn ShapeSource>) -> Self {
        Self::new(
            store,
            shape_source,
            Arc::new(SystemClock),
            RegistryPolicy::default(),
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn policy(&self) -> RegistryPolicy {
        self.policy
    }

    pub fn local_id(&self) -> Option<&WindowId> {
        self.local.as_ref().map(|r| &r.id)
    }

    pub fn local_record(&self) -> Option<&WindowRecord> {
        self.local.as_ref()
    }

    /// The current reconciled snapshot, in first-observed order. Pure read,
    /// safe to call every frame.
    pub fn windows(&self) -> &[WindowRecord] {
        self.snapshot.records()
    }

    // -----------------------------------------------------------------------
    // Subscription
    // -----------------------------------------------------------------------

    /// Invoked with the local window's updated shape whenever it changes,
    /// synchronously from within the tick.
    pub fn on_shape_change(&mut self, callback: impl FnMut(Rect) + Send + 'static) {
        self.shape_handler = Some(Box::new(callback));
    }

    /// Invoked with the new ordered snapshot whenever membership changes.
    /// Shape drift alone does not fire it.
    pub fn on_windows_change(&mut self, callback: impl FnMut(&[WindowRecord]) + Send + 'static) {
        self.windows_handler = Some(Box::new(callback));
    }

    /// Subscribe to the store's external-change notifications; the tick
    /// driver uses this to reconcile as soon as a peer writes.
    pub fn watch_store(&self, callback: ChangeCallback) -> Result<WatchHandle, StoreError> {
        self.store.watch_external(callback)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Register the local window and publish it into the shared set.
    ///
    /// Re-entry keeps the existing identity and simply republishes, so a
    /// double initialize never creates a duplicate record. A dead store is
    /// logged, not fatal: the registry degrades to a single-window view and
    /// retries on every tick.
    pub fn initialize(&mut self, metadata: serde_json::Value) {
        let now = self.clock.now_ms();
        match self.local.as_mut() {
            Some(record) => {
                record.touch(now);
            }
            None => {
                let record = WindowRecord::new(
                    WindowId::new(),
                    self.shape_source.current_shape(),
                    metadata,
                    now,
                );
                info!(id = %record.id, "registering local window");
                self.local = Some(record);
            }
        }
        self.synchronize(now);
    }

    /// One synchronize-and-reconcile cycle. Invoked on a recurring schedule
    /// by the tick driver; a no-op before `initialize`.
    pub fn tick(&mut self) {
        if self.local.is_none() {
            return;
        }
        let now = self.clock.now_ms();
        self.refresh_local(now);
        self.synchronize(now);
    }

    /// Best-effort removal of the local record, the fast path on a clean
    /// unload. Not relied upon for correctness: peers that never see this
    /// fall back to the liveness sweeper.
    pub fn depart(&mut self) {
        let Some(local) = self.local.take() else {
            return;
        };
        match self.store.read_all() {
            Ok(mut records) => {
                records.retain(|r| r.id != local.id);
                if let Err(e) = self.store.write_all(&records) {
                    warn!("failed to publish departure: {e}");
                }
            }
            Err(e) => warn!("failed to publish departure: {e}"),
        }
        debug!(id = %local.id, "local window departed");
    }

    // -----------------------------------------------------------------------
    // Tick internals
    // -----------------------------------------------------------------------

    fn refresh_local(&mut self, now_ms: i64) {
        let Some(local) = self.local.as_mut() else {
            return;
        };
        let shape = self.shape_source.current_shape();
        let moved = shape != local.shape;
        local.shape = shape;
        local.touch(now_ms);

        if moved {
            if let Some(handler) = self.shape_handler.as_mut() {
                handler(shape);
            }
        }
    }

    /// Read, sweep, merge the local record, write back, diff membership.
    fn synchronize(&mut self, now_ms: i64) {
        let Some(local) = self.local.clone() else {
            return;
        };

        let mut records = match self.store.read_all() {
            Ok(records) => {
                if self.store_down {
                    info!("shared store recovered, rejoining peers");
                    self.store_down = false;
                }
                records
            }
            Err(e) => {
                if !self.store_down {
                    warn!("shared store unavailable, continuing single-window: {e}");
                    self.store_down = true;
                }
                // Degraded view: only the local record until the store
                // comes back.
                if self.snapshot.reconcile(std::slice::from_ref(&local)) {
                    self.notify_windows_changed();
                }
                return;
            }
        };

        self.sweeper.sweep(&mut records, now_ms);
        dedupe_by_id(&mut records);
        merge_record(&mut records, local);

        if let Err(e) = self.store.write_all(&records) {
            warn!("failed to publish window set: {e}");
        }

        if self.snapshot.reconcile(&records) {
            self.notify_windows_changed();
        }
    }

    fn notify_windows_changed(&mut self) {
        if let Some(handler) = self.windows_handler.as_mut() {
            handler(self.snapshot.records());
        }
    }
}

/// Insert-or-replace by id; the local record always wins over whatever the
/// store currently holds for it.
fn merge_record(records: &mut Vec<WindowRecord>, local: WindowRecord) {
    match records.iter_mut().find(|r| r.id == local.id) {
        Some(slot) => *slot = local,
        None => records.push(local),
    }
}

/// Collapse duplicate ids, keeping the copy with the newest `last_seen`.
/// Duplicates only arise from write races and are never surfaced.
fn dedupe_by_id(records: &mut Vec<WindowRecord>) {
    let mut deduped: Vec<WindowRecord> = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        match deduped.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                debug!(id = %record.id, "collapsing duplicate window record");
                if record.last_seen > existing.last_seen {
                    *existing = record;
                }
            }
            None => deduped.push(record),
        }
    }
    *records = deduped;
}
