//! Fatal-error channel.
//!
//! The tracker returns unrecoverable conditions as [`TrackError`] values.
//! An agent that cannot continue without trustworthy tracking hands them to
//! a [`FatalReporter`], which never returns.

use crate::error::{ErrorKind, Result, TrackError};

/// Terminates the process (or the test) on an unrecoverable error.
pub trait FatalReporter {
    /// Report `message` and stop.
    fn report(&self, kind: ErrorKind, message: &str) -> !;
}

/// Prints a diagnostic to stderr and aborts the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortReporter;

impl FatalReporter for AbortReporter {
    fn report(&self, kind: ErrorKind, message: &str) -> ! {
        eprintln!("[class-track] FATAL ERROR ({kind:?}): {message}");
        std::process::abort()
    }
}

/// Report `err` through `reporter`.
pub fn report_error(reporter: &impl FatalReporter, err: &TrackError) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(kind = ?err.kind(), error = %err, "fatal");

    reporter.report(err.kind(), &err.to_string())
}

/// Abort the process with a diagnostic for `err`.
pub fn exit_error(err: &TrackError) -> ! {
    report_error(&AbortReporter, err)
}

/// Turn tracker errors into process exits.
pub trait TrackResultExt<T> {
    /// Unwrap, aborting the process on error.
    fn or_exit(self) -> T;

    /// Unwrap, reporting any error through `reporter`.
    fn or_report(self, reporter: &impl FatalReporter) -> T;
}

impl<T> TrackResultExt<T> for Result<T> {
    fn or_exit(self) -> T {
        self.unwrap_or_else(|err| exit_error(&err))
    }

    fn or_report(self, reporter: &impl FatalReporter) -> T {
        self.unwrap_or_else(|err| report_error(reporter, &err))
    }
}
