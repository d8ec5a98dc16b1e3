//! Error types.
//!
//! The tracker has no soft failures. Everything here is either a misuse of
//! the API that left state untouched, or an unrecoverable condition after
//! which the tracker's bookkeeping can no longer be trusted.

use std::fmt;

use crate::tag::Tag;

/// Result alias used throughout the crate.
pub type Result<T, E = TrackError> = std::result::Result<T, E>;

/// Host call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    /// Opening the private tagging session.
    OpenSession,
    /// Enumerating loaded classes.
    LoadedClasses,
    /// Resolving a class signature.
    Signature,
    /// Tagging a class object.
    SetTag,
    /// Reading a class object's tag.
    GetTag,
    /// Counting live holders of a tag.
    LiveCount,
    /// Disposing of the tagging session.
    CloseSession,
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenSession => "open tag session",
            Self::LoadedClasses => "loaded classes",
            Self::Signature => "signature",
            Self::SetTag => "set tag",
            Self::GetTag => "get tag",
            Self::LiveCount => "objects with tag",
            Self::CloseSession => "close tag session",
        };
        f.write_str(name)
    }
}

/// Category of a host failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    /// The handle does not name a class.
    InvalidClass,
    /// The host could not allocate.
    OutOfMemory,
    /// The call is not allowed in the current VM phase.
    WrongPhase,
    /// The session lacks the tagging capability.
    MissingCapability,
    /// Anything else the host reports.
    Internal,
}

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct HostError {
    /// Failure category.
    pub kind: HostErrorKind,
    /// Host-provided detail.
    pub message: String,
}

impl HostError {
    /// Build a host error.
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Broad classification of a [`TrackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required host call failed.
    HostFailure,
    /// Tracker bookkeeping disagrees with the host.
    Internal,
    /// The caller broke the API contract.
    Contract,
}

/// Errors surfaced by [`ClassTracker`](crate::ClassTracker).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    /// A host call failed.
    #[error("{op} failed: {source}")]
    Host {
        /// The failing call.
        op: HostOp,
        /// Host detail.
        source: HostError,
    },

    /// The class already carries a tag in the tracking session.
    #[error("attempting to insert duplicate class (already tagged {tag})")]
    DuplicateClass {
        /// Tag already present on the class.
        tag: Tag,
    },

    /// More than one live object carries a single tag.
    #[error("unexpected extra tags in tracking session: {tag} held by {count} live objects")]
    InconsistentTags {
        /// The queried tag.
        tag: Tag,
        /// Live holders reported by the oracle.
        count: usize,
    },

    /// An operation needed an initialized tracker.
    #[error("class tracker is not initialized")]
    NotInitialized,

    /// `initialize` was called twice without a `reset` in between.
    #[error("class tracker is already initialized")]
    AlreadyInitialized,

    /// An earlier unrecoverable error left the tracker unusable.
    #[error("class tracker is poisoned by an earlier unrecoverable error")]
    Poisoned,
}

impl TrackError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Host { .. } => ErrorKind::HostFailure,
            Self::InconsistentTags { .. } | Self::Poisoned => ErrorKind::Internal,
            Self::DuplicateClass { .. } | Self::NotInitialized | Self::AlreadyInitialized => {
                ErrorKind::Contract
            }
        }
    }

    /// `true` if tracking state can no longer be trusted.
    ///
    /// Such errors must never be retried. The embedding agent normally hands
    /// them to [`exit_error`](crate::fatal::exit_error).
    #[must_use]
    pub const fn is_unrecoverable(&self) -> bool {
        !matches!(self, Self::NotInitialized | Self::AlreadyInitialized)
    }
}

/// Attach the failing [`HostOp`] to a host result.
pub(crate) trait HostResultExt<T> {
    fn during(self, op: HostOp) -> Result<T>;
}

impl<T> HostResultExt<T> for std::result::Result<T, HostError> {
    fn during(self, op: HostOp) -> Result<T> {
        self.map_err(|source| TrackError::Host { op, source })
    }
}
