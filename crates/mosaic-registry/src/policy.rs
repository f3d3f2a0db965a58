use std::time::Duration;

use tracing::warn;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(250);
pub const DEFAULT_STALENESS_THRESHOLD: Duration = Duration::from_millis(1500);

/// Timing policy: how often a context republishes its record, and how old
/// a peer's record may grow before it is evicted.
///
/// Shorter periods converge faster but proportionally increase store churn;
/// the defaults give sub-second convergence at four writes per second per
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryPolicy {
    pub tick_period: Duration,
    pub staleness_threshold: Duration,
}

impl RegistryPolicy {
    /// A threshold at or below the tick period would evict healthy peers
    /// between their own refreshes, so it is clamped to twice the period.
    pub fn new(tick_period: Duration, staleness_threshold: Duration) -> Self {
        let min = tick_period * 2;
        let staleness_threshold = if staleness_threshold < min {
            warn!(
                requested_ms = staleness_threshold.as_millis() as u64,
                clamped_ms = min.as_millis() as u64,
                "staleness threshold below twice the tick period, clamping"
            );
            min
        } else {
            staleness_threshold
        };

        Self {
            tick_period,
            staleness_threshold,
        }
    }

    pub fn tick_ms(&self) -> i64 {
        self.tick_period.as_millis() as i64
    }

    pub fn staleness_ms(&self) -> i64 {
        self.staleness_threshold.as_millis() as i64
    }
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            staleness_threshold: DEFAULT_STALENESS_THRESHOLD,
        }
    }
}
