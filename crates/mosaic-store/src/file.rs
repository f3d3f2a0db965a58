//! File-backed shared store for window contexts in separate processes.
//!
//! The collection lives in a single JSON file. Reads tolerate a missing
//! file (empty collection); writes go through a temp file and rename so a
//! concurrent reader never observes a partial payload. External changes are
//! detected with a `notify` watcher on the parent directory, filtered to
//! the store file and to payloads that differ from our own last write.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use mosaic_common::{StoreError, WindowRecord};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error};

use crate::{codec, ChangeCallback, Result, SharedStore, WatchHandle};

pub struct FileStore {
    path: PathBuf,
    last_written: Arc<Mutex<Option<String>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SharedStore for FileStore {
    fn read_all(&self) -> Result<Vec<WindowRecord>> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(codec::decode(&payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Unavailable(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, records: &[WindowRecord]) -> Result<()> {
        let payload = codec::encode(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!(
                        "failed to create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        // Unique temp name per write: concurrent writers must not rename
        // each other's half-written files.
        static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);
        let tmp = self.path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp, &payload).map_err(|e| {
            StoreError::Unavailable(format!("failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            StoreError::Unavailable(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        if let Ok(mut last) = self.last_written.lock() {
            *last = Some(payload);
        }
        Ok(())
    }

    fn watch_external(&self, callback: ChangeCallback) -> Result<WatchHandle> {
        let path = self.path.clone();
        let watch_path = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => path.clone(),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let last_written = self.last_written.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        error!("store file watcher error: {e}");
                        return;
                    }
                };

                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let is_our_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n == file_name).unwrap_or(false));
                if !is_our_file {
                    return;
                }

                // Renames of our own temp file land here too; skip anything
                // that matches the payload we just wrote ourselves.
                let contents = std::fs::read_to_string(&path).ok();
                let own_write = match (contents.as_ref(), last_written.lock()) {
                    (Some(contents), Ok(last)) => last.as_deref() == Some(contents.as_str()),
                    _ => false,
                };
                if own_write {
                    return;
                }

                debug!("external change to window collection file");
                callback();
            },
            notify::Config::default(),
        )
        .map_err(|e| StoreError::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| {
                StoreError::Watch(format!("failed to watch {}: {e}", watch_path.display()))
            })?;

        Ok(WatchHandle::new(watcher))
    }
}
