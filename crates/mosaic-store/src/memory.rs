//! In-process shared store: one hub, many handles.
//!
//! Each handle models one window context of the same origin. All handles
//! read and write the same encoded payload; a write notifies the change
//! watchers of every handle except the writer's own, mirroring how browser
//! storage events are delivered only to other contexts. Also serves as the
//! substitutable fake for registry tests.

use std::sync::{Arc, Mutex, MutexGuard};

use mosaic_common::{StoreError, WindowRecord};

use crate::{codec, ChangeCallback, Result, SharedStore, WatchHandle};

struct Watcher {
    id: u64,
    handle: u64,
    callback: Arc<dyn Fn() + Send + Sync>,
}

#[derive(Default)]
struct Hub {
    payload: Option<String>,
    watchers: Vec<Watcher>,
    next_handle: u64,
    next_watcher: u64,
}

pub struct MemoryStore {
    hub: Arc<Mutex<Hub>>,
    handle: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        let hub = Hub {
            next_handle: 1,
            ..Hub::default()
        };
        Self {
            hub: Arc::new(Mutex::new(hub)),
            handle: 0,
        }
    }

    /// Open another handle onto the same store, as another window of the
    /// same origin would.
    pub fn handle(&self) -> Self {
        let hub = self.hub.clone();
        let handle = match hub.lock() {
            Ok(mut guard) => {
                let handle = guard.next_handle;
                guard.next_handle += 1;
                handle
            }
            Err(_) => u64::MAX,
        };
        Self { hub, handle }
    }

    fn hub(&self) -> Result<MutexGuard<'_, Hub>> {
        self.hub
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<WindowRecord>> {
        let payload = self.hub()?.payload.clone();
        Ok(match payload {
            Some(payload) => codec::decode(&payload),
            None => Vec::new(),
        })
    }

    fn write_all(&self, records: &[WindowRecord]) -> Result<()> {
        let payload = codec::encode(records)?;

        // Collect callbacks under the lock, invoke outside it: a callback
        // is free to read the store again.
        let callbacks: Vec<Arc<dyn Fn() + Send + Sync>> = {
            let mut hub = self.hub()?;
            hub.payload = Some(payload);
            hub.watchers
                .iter()
                .filter(|w| w.handle != self.handle)
                .map(|w| w.callback.clone())
                .collect()
        };

        for callback in callbacks {
            callback();
        }
        Ok(())
    }

    fn watch_external(&self, callback: ChangeCallback) -> Result<WatchHandle> {
        let watcher_id = {
            let mut hub = self.hub()?;
            let id = hub.next_watcher;
            hub.next_watcher += 1;
            hub.watchers.push(Watcher {
                id,
                handle: self.handle,
                callback: Arc::from(callback),
            });
            id
        };

        Ok(WatchHandle::new(WatchGuard {
            hub: self.hub.clone(),
            watcher_id,
        }))
    }
}

struct WatchGuard {
    hub: Arc<Mutex<Hub>>,
    watcher_id: u64,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Ok(mut hub) = self.hub.lock() {
            hub.watchers.retain(|w| w.id != self.watcher_id);
        }
    }
}
