//! Eviction of records left behind by windows that vanished without a
//! departure: crashed, force-killed, or discarded by the browser.

use std::time::Duration;

use mosaic_common::WindowRecord;
use tracing::info;

/// Removes records whose owners stopped publishing.
///
/// Eviction is unconditional once the threshold is exceeded: there is no
/// coordinator to arbitrate disputes, so the timeout is authoritative. An
/// explicit departure is only a latency optimization over this.
#[derive(Debug, Clone, Copy)]
pub struct LivenessSweeper {
    threshold_ms: i64,
}

impl LivenessSweeper {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold_ms: threshold.as_millis() as i64,
        }
    }

    pub fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }

    /// Drop every record strictly older than the threshold.
    pub fn sweep(&self, records: &mut Vec<WindowRecord>, now_ms: i64) {
        records.retain(|record| {
            let stale = record.is_stale(now_ms, self.threshold_ms);
            if stale {
                info!(
                    id = %record.id,
                    age_ms = record.age_ms(now_ms),
                    "evicting stale window record"
                );
            }
            !stale
        });
    }
}
