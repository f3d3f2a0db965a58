//! Versioned JSON envelope for the persisted window collection.
//!
//! The underlying store has no schema enforcement, so decode is defensive:
//! each entry parses independently and a corrupt entry is dropped without
//! aborting the rest. An unreadable envelope or unknown version yields an
//! empty collection — every live window republishes its record on its next
//! tick, so the set self-heals.

use mosaic_common::{StoreError, WindowRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Current on-the-wire schema version.
pub const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    windows: Vec<serde_json::Value>,
}

pub fn encode(records: &[WindowRecord]) -> Result<String, StoreError> {
    let windows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    serde_json::to_string(&Envelope {
        version: STORE_VERSION,
        windows,
    })
    .map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode(payload: &str) -> Vec<WindowRecord> {
    let envelope: Envelope = match serde_json::from_str(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("unreadable window collection, starting empty: {e}");
            return Vec::new();
        }
    };

    if envelope.version != STORE_VERSION {
        warn!(
            version = envelope.version,
            "unknown window collection version, starting empty"
        );
        return Vec::new();
    }

    envelope
        .windows
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WindowRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("dropping malformed window record: {e}");
                None
            }
        })
        .collect()
}
