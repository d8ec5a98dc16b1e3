//! Host capabilities consumed by the tracker.
//!
//! The tracker never talks to a virtual machine directly. The embedding
//! agent supplies two collaborators:
//!
//! - a [`ClassEnumerator`] that lists loaded classes and resolves their
//!   signatures, and
//! - a [`LivenessOracle`] that opens a private [`TagSession`] in which class
//!   objects carry 64-bit tags and the number of live holders of a tag can be
//!   queried.
//!
//! Both are plain traits so tests can drive the tracker with fakes.

use crate::error::HostError;
use crate::tag::Tag;

bitflags::bitflags! {
    /// Class status bits as reported by the host.
    ///
    /// The values match the JVMTI `JVMTI_CLASS_STATUS_*` constants. Bits the
    /// host sets beyond these are kept; wrap raw host values with
    /// [`ClassStatus::from_bits_retain`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassStatus: u32 {
        /// Bytecode verification has completed.
        const VERIFIED = 1 << 0;
        /// Linking has completed; the class is usable.
        const PREPARED = 1 << 1;
        /// Static initializers have run.
        const INITIALIZED = 1 << 2;
        /// Initialization failed.
        const ERROR = 1 << 3;
        /// The class is an array type.
        const ARRAY = 1 << 4;
        /// The class is a primitive type.
        const PRIMITIVE = 1 << 5;
    }
}

/// One entry of a loaded-class enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClass<C> {
    /// Host handle for the class object.
    pub class: C,
    /// Status bits at enumeration time.
    pub status: ClassStatus,
}

impl<C> LoadedClass<C> {
    /// Pair a handle with its status.
    pub const fn new(class: C, status: ClassStatus) -> Self {
        Self { class, status }
    }
}

/// Lists loaded classes and resolves their signatures.
pub trait ClassEnumerator {
    /// Host handle for a class object.
    type Class;

    /// All currently loaded classes, in host order.
    fn loaded_classes(&self) -> Result<Vec<LoadedClass<Self::Class>>, HostError>;

    /// Type signature of `class`, e.g. `Ljava/lang/String;`.
    fn signature_of(&self, class: &Self::Class) -> Result<String, HostError>;
}

/// Opens private tagging sessions.
pub trait LivenessOracle<C> {
    /// Session type handed out by [`open_session`](Self::open_session).
    type Session: TagSession<C>;

    /// Open a session whose tag namespace is not shared with anyone else.
    fn open_session(&self) -> Result<Self::Session, HostError>;
}

/// A private tag namespace on the host.
pub trait TagSession<C> {
    /// Attach `tag` to `class` in this session.
    fn set_tag(&mut self, class: &C, tag: Tag) -> Result<(), HostError>;

    /// Current tag of `class` in this session, `None` if untagged.
    fn tag_of(&self, class: &C) -> Result<Option<Tag>, HostError>;

    /// Number of live objects carrying `tag` in this session.
    ///
    /// A healthy session reports `0` or `1`.
    fn live_count(&self, tag: Tag) -> Result<usize, HostError>;

    /// Dispose of the session and every tag in it.
    fn close(self) -> Result<(), HostError>
    where
        Self: Sized;
}
