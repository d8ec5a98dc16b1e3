//! Tracker configuration.

use crate::host::ClassStatus;
use crate::output::DEFAULT_OUTPUT_CAPACITY;

/// Status bits that make a class worth tracking at startup.
pub const DEFAULT_WANTED_STATUS: ClassStatus = ClassStatus::PREPARED.union(ClassStatus::ARRAY);

/// Knobs for a [`ClassTracker`](crate::ClassTracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Ask the session for a class's existing tag before inserting it and
    /// reject classes that already carry one. Costs one host call per add.
    pub check_duplicates: bool,
    /// A loaded class is tracked by `initialize` if its status shares any bit
    /// with this mask.
    pub wanted_status: ClassStatus,
    /// Initial capacity of each unload pass's output collection.
    pub output_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            check_duplicates: cfg!(debug_assertions),
            wanted_status: DEFAULT_WANTED_STATUS,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

impl TrackerConfig {
    /// Enable or disable the duplicate-insertion check.
    #[must_use]
    pub const fn with_duplicate_check(mut self, enabled: bool) -> Self {
        self.check_duplicates = enabled;
        self
    }

    /// Replace the startup status mask.
    #[must_use]
    pub const fn with_wanted_status(mut self, status: ClassStatus) -> Self {
        self.wanted_status = status;
        self
    }

    /// Replace the output collection's initial capacity.
    #[must_use]
    pub const fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }
}
