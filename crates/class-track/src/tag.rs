//! Liveness tags and their allocator.

use std::fmt;
use std::num::NonZeroU64;

/// Opaque identifier attached to a class object through the liveness oracle.
///
/// Tags are never zero; the oracle uses zero to mean "untagged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(NonZeroU64);

impl Tag {
    /// Wrap a raw tag value. Returns `None` for zero.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// The raw 64-bit value handed to the oracle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<Tag> for u64 {
    fn from(tag: Tag) -> Self {
        tag.get()
    }
}

/// Monotonic tag source.
///
/// Every tag returned is strictly greater than all tags returned before it.
/// Tags are never recycled, even after the class they named is unloaded.
/// Exhausting `2^64 - 1` values would take that many class loads.
#[derive(Debug, Clone, Default)]
pub struct TagAllocator {
    last: u64,
}

impl TagAllocator {
    /// Create an allocator whose first tag is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Hand out the next tag.
    ///
    /// # Panics
    ///
    /// Panics once all `2^64 - 1` tags have been handed out.
    pub fn allocate(&mut self) -> Tag {
        let Some(next) = self.last.checked_add(1).and_then(NonZeroU64::new) else {
            panic!("tag space exhausted after {} allocations", self.last);
        };
        self.last = next.get();
        Tag(next)
    }

    /// The most recently allocated tag, if any.
    #[must_use]
    pub const fn last(&self) -> Option<Tag> {
        Tag::new(self.last)
    }

    /// Number of tags handed out so far.
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.last
    }
}
