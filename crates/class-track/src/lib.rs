//! Class unload tracking for debugger agents.
//!
//! A virtual machine tells a debugger agent that *some* classes were
//! unloaded, but not which. `class-track` reconstructs the answer: every
//! prepared class gets a fresh 64-bit tag in a private tagging session, and
//! after an unload notification the tracker asks the host which tags still
//! have a live holder. Classes whose tag has none were unloaded.
//!
//! # Features
//!
//! - **No weak references**: liveness is answered by the host's tag queries
//! - **Never-reused tags**: a monotonic 64-bit counter, one tag per class load
//! - **Single-pass partition**: one oracle query per tracked class
//! - **Injectable host**: [`ClassEnumerator`] and [`LivenessOracle`] are traits
//!
//! # Quick Start
//!
//! ```ignore
//! use class_track::{ClassTracker, TrackResultExt};
//!
//! // `vm` implements `ClassEnumerator` and `LivenessOracle`.
//! let mut tracker = ClassTracker::new(vm.clone(), vm);
//! tracker.initialize().or_exit();
//!
//! // On every class-prepare event:
//! tracker.add_prepared_class(&class).or_exit();
//!
//! // After a batch of unload events:
//! tracker.note_unload();
//! if let Some(unloaded) = tracker.process_pending_unloads().or_exit() {
//!     for signature in unloaded {
//!         send_class_unload_event(&signature);
//!     }
//! }
//! ```
//!
//! # Thread Safety
//!
//! The tracker performs no locking. Every operation takes `&mut self`; agents
//! that deliver events on several threads keep the tracker in a
//! [`HandlerLock`].

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
pub mod fatal;
mod host;
mod metrics;
mod output;
pub mod registry;
mod sync;
mod tag;
mod tracing;
mod tracker;

// Re-export public API
pub use config::{TrackerConfig, DEFAULT_WANTED_STATUS};
pub use error::{ErrorKind, HostError, HostErrorKind, HostOp, Result, TrackError};
pub use fatal::{exit_error, FatalReporter, TrackResultExt};
pub use host::{ClassEnumerator, ClassStatus, LivenessOracle, LoadedClass, TagSession};
pub use metrics::{PassStats, TrackerMetrics};
pub use output::{UnloadedClasses, DEFAULT_OUTPUT_CAPACITY};
pub use registry::{Registry, TrackedClass};
pub use sync::HandlerLock;
pub use tag::{Tag, TagAllocator};
pub use tracker::ClassTracker;
