//! Class tracking tracing support.
//!
//! When the `tracing` feature is enabled, this module provides structured
//! tracing spans and events for tracker operations.

#[cfg(feature = "tracing")]
pub mod internal {
    use tracing::{span, Level};

    use crate::error::TrackError;
    use crate::tag::Tag;

    /// Identifier of an unload pass.
    ///
    /// Used to correlate every event emitted by one pass. Counts up from 1
    /// per tracker instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PassId(pub u64);

    /// Create a span for the startup enumeration.
    pub fn trace_initialize() -> span::EnteredSpan {
        span!(Level::DEBUG, "class_track_initialize").entered()
    }

    /// Create a span for one unload pass.
    pub fn trace_unload_pass(pass_id: PassId, tracked: usize) -> span::EnteredSpan {
        span!(
            Level::DEBUG,
            "process_unloads",
            pass_id = pass_id.0,
            tracked = tracked
        )
        .entered()
    }

    /// Log a newly tracked class.
    pub fn log_class_tracked(tag: Tag, signature: &str) {
        tracing::trace!(tag = tag.get(), signature, "class_tracked");
    }

    /// Log a class found unloaded.
    pub fn log_class_unloaded(signature: &str) {
        tracing::debug!(signature, "class_unloaded");
    }

    /// Log the end of the startup enumeration.
    pub fn log_initialized(enumerated: usize, tracked: usize) {
        tracing::debug!(enumerated, tracked, "initialized");
    }

    /// Log the end of an unload pass.
    pub fn log_pass_end(examined: usize, unloaded: usize) {
        tracing::debug!(examined, unloaded, "pass_end");
    }

    /// Log a teardown.
    pub fn log_reset(released: usize) {
        tracing::debug!(released, "reset");
    }

    /// Log an error that poisoned the tracker.
    pub fn log_unrecoverable(err: &TrackError) {
        tracing::error!(kind = ?err.kind(), error = %err, "unrecoverable");
    }
}

#[cfg(not(feature = "tracing"))]
pub mod internal {
    /// Stub type when tracing is disabled.
    #[allow(dead_code)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PassId(pub u64);
}

#[allow(unused_imports)]
pub use internal::PassId;
