//! Simulated window contexts: each owns a registry over a handle of the
//! same shared store and stands in for one browser window on the screen.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mosaic_common::{Rect, SystemClock};
use mosaic_registry::{spawn_ticker, Registry, RegistryPolicy, SharedRegistry, TickerHandle};
use mosaic_store::{FileStore, MemoryStore, SharedStore};
use rand::Rng;
use serde_json::json;
use tracing::{debug, info};

use crate::config::ScreenSection;

/// Where the shared collection lives: an in-process hub, or a JSON file so
/// separate `mosaic` processes can join the same scene.
pub enum StoreBackend {
    Memory(MemoryStore),
    File(PathBuf),
}

impl StoreBackend {
    /// One store handle per window context, as each browser window opens
    /// its own connection to the same origin-scoped storage.
    pub fn open_handle(&self) -> Box<dyn SharedStore> {
        match self {
            StoreBackend::Memory(store) => Box::new(store.handle()),
            StoreBackend::File(path) => Box::new(FileStore::new(path.clone())),
        }
    }
}

pub struct SimulatedContext {
    pub label: String,
    registry: SharedRegistry,
    shape: Arc<Mutex<Rect>>,
    ticker: TickerHandle,
}

impl SimulatedContext {
    /// Open a context: register with the shared store and start its tick
    /// loop.
    pub fn open(
        store: &StoreBackend,
        label: &str,
        policy: RegistryPolicy,
        screen: &ScreenSection,
    ) -> Self {
        let mut rng = rand::thread_rng();
        let width = 480.0_f64.min(screen.width);
        let height = 360.0_f64.min(screen.height);
        let shape = Arc::new(Mutex::new(Rect::new(
            rng.gen_range(0.0..=(screen.width - width).max(0.0)),
            rng.gen_range(0.0..=(screen.height - height).max(0.0)),
            width,
            height,
        )));

        let source = shape.clone();
        let mut registry = Registry::new(
            store.open_handle(),
            Box::new(move || source.lock().map(|r| *r).unwrap_or_default()),
            Arc::new(SystemClock),
            policy,
        );

        let context = label.to_string();
        registry.on_windows_change(move |windows| {
            let labels: Vec<&str> = windows
                .iter()
                .map(|r| r.metadata["label"].as_str().unwrap_or("?"))
                .collect();
            info!(context = %context, windows = ?labels, "window set changed");
        });
        let context = label.to_string();
        registry.on_shape_change(move |rect| {
            debug!(context = %context, x = rect.x, y = rect.y, "window moved");
        });

        registry.initialize(json!({"label": label}));

        let registry = Arc::new(Mutex::new(registry));
        let ticker = spawn_ticker(registry.clone());

        Self {
            label: label.to_string(),
            registry,
            shape,
            ticker,
        }
    }

    /// Nudge the window by up to `max_step` pixels on each axis, staying on
    /// the screen.
    pub fn drift(&self, max_step: f64, screen: &ScreenSection) {
        if max_step <= 0.0 {
            return;
        }
        let mut rng = rand::thread_rng();
        if let Ok(mut shape) = self.shape.lock() {
            shape.x = (shape.x + rng.gen_range(-max_step..=max_step))
                .clamp(0.0, (screen.width - shape.width).max(0.0));
            shape.y = (shape.y + rng.gen_range(-max_step..=max_step))
                .clamp(0.0, (screen.height - shape.height).max(0.0));
        }
    }

    /// Labels of the windows this context currently sees, in snapshot
    /// order.
    pub fn visible_labels(&self) -> Vec<String> {
        match self.registry.lock() {
            Ok(guard) => guard
                .windows()
                .iter()
                .map(|r| r.metadata["label"].as_str().unwrap_or("?").to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Clean shutdown: stop ticking, then announce departure.
    pub async fn close(self) {
        self.ticker.stop().await;
        if let Ok(mut guard) = self.registry.lock() {
            guard.depart();
        }
        info!(context = %self.label, "context closed");
    }

    /// Abrupt shutdown: the tick loop dies and nothing else happens, as
    /// with a crashed or force-killed window. Peers rely on the sweeper.
    pub async fn crash(self) {
        self.ticker.stop().await;
        info!(context = %self.label, "context crashed");
    }
}
