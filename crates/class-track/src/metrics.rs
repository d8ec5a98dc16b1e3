//! Tracker statistics.

use std::time::Duration;

/// Statistics from a single unload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Records queried against the oracle.
    pub examined: usize,
    /// Records found dead and released.
    pub unloaded: usize,
    /// Wall time of the pass.
    pub duration: Duration,
}

/// Cumulative statistics for a tracker instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerMetrics {
    /// Records currently tracked.
    pub classes_tracked: usize,
    /// Tags handed out since construction.
    pub tags_allocated: u64,
    /// Classes reported unloaded since construction.
    pub total_unloaded: usize,
    /// Completed unload passes since construction.
    pub unload_passes: usize,
    /// The most recent completed pass.
    pub last_pass: PassStats,
}

impl TrackerMetrics {
    /// Create a new `TrackerMetrics` with all fields set to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            classes_tracked: 0,
            tags_allocated: 0,
            total_unloaded: 0,
            unload_passes: 0,
            last_pass: PassStats {
                examined: 0,
                unloaded: 0,
                duration: Duration::ZERO,
            },
        }
    }

    pub(crate) fn record_pass(&mut self, pass: PassStats) {
        self.unload_passes += 1;
        self.total_unloaded += pass.unloaded;
        self.last_pass = pass;
    }
}
