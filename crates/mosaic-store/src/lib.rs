//! Shared store adapter: the origin-scoped collection every window context
//! of the same scene reads and writes.
//!
//! Writes are whole-collection replace; there is no partial-update or
//! compare-and-swap API. Callers read-modify-write and tolerate the race —
//! the registry protocol is built on every window republishing its own
//! authoritative record each tick.

pub mod codec;
pub mod file;
pub mod memory;

use mosaic_common::{StoreError, WindowRecord};

pub use file::FileStore;
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Callback invoked when another context writes to the store. Never fired
/// for the subscribing context's own writes.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Keeps a change subscription alive; dropping it ends the subscription.
pub struct WatchHandle {
    _inner: Box<dyn std::any::Any + Send>,
}

impl WatchHandle {
    pub fn new(inner: impl std::any::Any + Send + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

/// Contract over an origin-scoped, synchronously readable/writable store
/// visible to every window context of the same origin.
pub trait SharedStore: Send + Sync {
    fn read_all(&self) -> Result<Vec<WindowRecord>>;
    fn write_all(&self, records: &[WindowRecord]) -> Result<()>;
    fn watch_external(&self, callback: ChangeCallback) -> Result<WatchHandle>;
}
