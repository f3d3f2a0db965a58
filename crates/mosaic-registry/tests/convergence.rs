//! Multi-context scenarios: several registries over one shared store, time
//! driven by hand so every assertion is deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mosaic_common::{ManualClock, Rect, StoreError, WindowRecord};
use mosaic_registry::{Registry, RegistryPolicy};
use mosaic_store::{ChangeCallback, MemoryStore, SharedStore, WatchHandle};
use serde_json::json;

const TICK_MS: i64 = 250;
const STALENESS_MS: i64 = 1500;

fn policy() -> RegistryPolicy {
    RegistryPolicy::new(
        Duration::from_millis(TICK_MS as u64),
        Duration::from_millis(STALENESS_MS as u64),
    )
}

fn context(store: &MemoryStore, clock: &ManualClock, x: f64) -> Registry {
    Registry::new(
        Box::new(store.handle()),
        Box::new(move || Rect::new(x, 0.0, 640.0, 480.0)),
        Arc::new(clock.clone()),
        policy(),
    )
}

fn labels(registry: &Registry) -> Vec<String> {
    registry
        .windows()
        .iter()
        .map(|r| r.metadata["label"].as_str().unwrap_or("?").to_string())
        .collect()
}

/// Snapshot as (id, shape) pairs for cross-context comparison.
fn view(registry: &Registry) -> Vec<(String, Rect)> {
    let mut pairs: Vec<(String, Rect)> = registry
        .windows()
        .iter()
        .map(|r| (r.id.to_string(), r.shape))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

#[test]
fn three_contexts_converge_then_survive_a_crash() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);

    let mut a = context(&store, &clock, 1.0);
    let mut b = context(&store, &clock, 2.0);
    let mut c = context(&store, &clock, 3.0);

    a.initialize(json!({"label": "a"}));
    b.initialize(json!({"label": "b"}));
    c.initialize(json!({"label": "c"}));

    // One more round so the earlier joiners observe the later ones.
    clock.advance(TICK_MS);
    a.tick();
    b.tick();
    c.tick();

    assert_eq!(labels(&a), vec!["a", "b", "c"]);
    assert_eq!(labels(&b), vec!["a", "b", "c"]);
    assert_eq!(labels(&c), vec!["a", "b", "c"]);
    assert_eq!(view(&a), view(&b));
    assert_eq!(view(&b), view(&c));

    // b stops ticking without any departure signal.
    let deadline = STALENESS_MS + TICK_MS;
    let mut elapsed = TICK_MS;
    while elapsed < deadline {
        clock.advance(TICK_MS);
        elapsed += TICK_MS;
        a.tick();
        c.tick();
    }
    clock.advance(TICK_MS);
    a.tick();
    c.tick();

    assert_eq!(labels(&a), vec!["a", "c"]);
    assert_eq!(labels(&c), vec!["a", "c"]);
    // c's index collapsed from 2 to 1; a's did not move.
    assert_eq!(a.windows()[1].metadata["label"], "c");
    assert_eq!(view(&a), view(&c));
}

#[test]
fn moves_propagate_to_every_context() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);

    let shape = Arc::new(std::sync::Mutex::new(Rect::new(0.0, 0.0, 640.0, 480.0)));
    let source = shape.clone();
    let mut mover = Registry::new(
        Box::new(store.handle()),
        Box::new(move || source.lock().map(|r| *r).unwrap_or_default()),
        Arc::new(clock.clone()),
        policy(),
    );
    let mut watcher = context(&store, &clock, 500.0);

    mover.initialize(json!({"label": "mover"}));
    watcher.initialize(json!({"label": "watcher"}));
    mover.tick();

    shape.lock().unwrap().x = 321.0;
    clock.advance(TICK_MS);
    mover.tick();
    watcher.tick();

    let mover_id = mover.local_id().unwrap();
    let seen = watcher
        .windows()
        .iter()
        .find(|r| &r.id == mover_id)
        .expect("mover visible to watcher");
    assert_eq!(seen.shape.x, 321.0);
    assert_eq!(view(&mover), view(&watcher));
}

/// Store wrapper whose reads and writes can be switched off, as when
/// storage is disabled or over quota.
struct FlakyStore {
    inner: MemoryStore,
    down: Arc<AtomicBool>,
}

impl SharedStore for FlakyStore {
    fn read_all(&self) -> Result<Vec<WindowRecord>, StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.inner.read_all()
    }

    fn write_all(&self, records: &[WindowRecord]) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.inner.write_all(records)
    }

    fn watch_external(&self, callback: ChangeCallback) -> Result<WatchHandle, StoreError> {
        self.inner.watch_external(callback)
    }
}

#[test]
fn store_outage_degrades_to_single_window_then_resyncs() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let down = Arc::new(AtomicBool::new(false));

    let flaky = FlakyStore {
        inner: store.handle(),
        down: down.clone(),
    };
    let mut a = Registry::new(
        Box::new(flaky),
        Box::new(|| Rect::new(1.0, 0.0, 640.0, 480.0)),
        Arc::new(clock.clone()),
        policy(),
    );
    let mut peer = context(&store, &clock, 2.0);

    a.initialize(json!({"label": "a"}));
    peer.initialize(json!({"label": "peer"}));
    clock.advance(TICK_MS);
    a.tick();
    assert_eq!(labels(&a), vec!["a", "peer"]);

    down.store(true, Ordering::SeqCst);
    for _ in 0..5 {
        clock.advance(TICK_MS);
        a.tick();
        peer.tick();
        assert_eq!(labels(&a), vec!["a"]);
    }

    down.store(false, Ordering::SeqCst);
    clock.advance(TICK_MS);
    a.tick();
    peer.tick();
    assert_eq!(labels(&a), vec!["a", "peer"]);
    assert_eq!(view(&a), view(&peer));
}

#[test]
fn outage_keeps_local_record_current() {
    let clock = ManualClock::new(0);
    let down = Arc::new(AtomicBool::new(true));

    let shape = Arc::new(std::sync::Mutex::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
    let source = shape.clone();
    let flaky = FlakyStore {
        inner: MemoryStore::new(),
        down: down.clone(),
    };
    let mut a = Registry::new(
        Box::new(flaky),
        Box::new(move || source.lock().map(|r| *r).unwrap_or_default()),
        Arc::new(clock.clone()),
        policy(),
    );

    a.initialize(json!(null));
    assert_eq!(a.windows().len(), 1);

    // The degraded snapshot still tracks the local window's movement.
    shape.lock().unwrap().x = 55.0;
    clock.advance(TICK_MS);
    a.tick();
    assert_eq!(a.windows()[0].shape.x, 55.0);
}

#[test]
fn late_joiner_converges_within_one_round() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);

    let mut a = context(&store, &clock, 1.0);
    let mut b = context(&store, &clock, 2.0);
    a.initialize(json!({"label": "a"}));
    b.initialize(json!({"label": "b"}));
    clock.advance(TICK_MS);
    a.tick();
    b.tick();

    let mut late = context(&store, &clock, 3.0);
    late.initialize(json!({"label": "late"}));
    assert_eq!(labels(&late), vec!["a", "b", "late"]);

    clock.advance(TICK_MS);
    a.tick();
    b.tick();
    late.tick();
    assert_eq!(labels(&a), vec!["a", "b", "late"]);
    assert_eq!(labels(&b), vec!["a", "b", "late"]);
    assert_eq!(view(&a), view(&late));
}
