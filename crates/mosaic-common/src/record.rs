//! The serializable unit describing one participating window.

use serde::{Deserialize, Serialize};

use crate::id::WindowId;
use crate::types::Rect;

/// One window context's entry in the shared collection.
///
/// The owning window is the only writer of `shape` and `last_seen`; every
/// other context treats the record as read-only. `metadata` is attached at
/// registration and immutable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub id: WindowId,
    pub shape: Rect,
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Millis timestamp of the owner's most recent publish. Liveness
    /// detection only, never business ordering.
    pub last_seen: i64,
}

impl WindowRecord {
    pub fn new(id: WindowId, shape: Rect, metadata: serde_json::Value, now_ms: i64) -> Self {
        Self {
            id,
            shape,
            metadata,
            last_seen: now_ms,
        }
    }

    /// Refresh the liveness marker.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_seen = now_ms;
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_seen)
    }

    /// Strictly older than the threshold; a record exactly at the threshold
    /// is still live.
    pub fn is_stale(&self, now_ms: i64, threshold_ms: i64) -> bool {
        self.age_ms(now_ms) > threshold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(last_seen: i64) -> WindowRecord {
        WindowRecord::new(
            WindowId::from("w"),
            Rect::new(0.0, 0.0, 640.0, 480.0),
            json!({"label": "w"}),
            last_seen,
        )
    }

    #[test]
    fn touch_refreshes_last_seen() {
        let mut r = record(100);
        r.touch(900);
        assert_eq!(r.last_seen, 900);
    }

    #[test]
    fn age_is_relative_to_now() {
        let r = record(1_000);
        assert_eq!(r.age_ms(1_750), 750);
    }

    #[test]
    fn age_never_negative() {
        // A peer's clock may run slightly ahead of ours.
        let r = record(2_000);
        assert_eq!(r.age_ms(1_000), 0);
    }

    #[test]
    fn stale_is_strict() {
        let r = record(0);
        assert!(!r.is_stale(1_500, 1_500));
        assert!(r.is_stale(1_501, 1_500));
    }

    #[test]
    fn record_from_future_is_never_stale() {
        let r = record(5_000);
        assert!(!r.is_stale(1_000, 1_500));
    }

    #[test]
    fn serializes_camel_case() {
        let r = record(42);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"lastSeen\":42"));
        assert!(!json.contains("last_seen"));
    }

    #[test]
    fn roundtrip() {
        let r = record(7);
        let json = serde_json::to_string(&r).unwrap();
        let back: WindowRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }

    #[test]
    fn missing_metadata_defaults_to_null() {
        let json = r#"{"id":"w","shape":{"x":0.0,"y":0.0,"width":1.0,"height":1.0},"lastSeen":3}"#;
        let r: WindowRecord = serde_json::from_str(json).unwrap();
        assert!(r.metadata.is_null());
    }

    #[test]
    fn metadata_survives_roundtrip() {
        let r = WindowRecord::new(
            WindowId::new(),
            Rect::default(),
            json!({"foo": "bar", "n": 3}),
            0,
        );
        let json = serde_json::to_string(&r).unwrap();
        let back: WindowRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata["foo"], "bar");
        assert_eq!(back.metadata["n"], 3);
    }
}
