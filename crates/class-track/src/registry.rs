//! Tracked-class registry.
//!
//! Records live in a slot store addressed by stable indices. Occupied slots
//! form a singly linked chain starting at `head`, most recently inserted
//! first. Vacant slots form a free list so storage is reused; tags are not.
//!
//! The unload pass walks the chain once, remembering which link points at
//! the record under examination (the head, or the previous survivor's
//! `next`). Dead records are spliced out by rewriting that link and are
//! pushed onto a separate pending chain, which [`DrainDead`] releases.

use std::collections::HashMap;

use crate::tag::Tag;

/// A class the tracker knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedClass {
    tag: Tag,
    signature: String,
}

impl TrackedClass {
    /// Pair a tag with the class signature.
    #[must_use]
    pub const fn new(tag: Tag, signature: String) -> Self {
        Self { tag, signature }
    }

    /// Tag the class carries in the tracking session.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Class signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Give up the record, keeping only its signature.
    #[must_use]
    pub fn into_signature(self) -> String {
        self.signature
    }
}

#[derive(Debug)]
enum Slot {
    Occupied {
        class: TrackedClass,
        next: Option<usize>,
    },
    Vacant {
        next_free: Option<usize>,
    },
}

/// Ordered collection of [`TrackedClass`] records.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    head: Option<usize>,
    free: Option<usize>,
    by_tag: HashMap<Tag, usize>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Number of storage slots, occupied or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `true` if a record with `tag` is tracked.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.by_tag.contains_key(&tag)
    }

    /// Look up the record for `tag`.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&TrackedClass> {
        let index = *self.by_tag.get(&tag)?;
        match &self.slots[index] {
            Slot::Occupied { class, .. } => Some(class),
            Slot::Vacant { .. } => None,
        }
    }

    /// Insert `class` at the head of the chain.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if a record with the same tag is already
    /// tracked. Tags come from a monotonic allocator, so this only fires on
    /// a broken caller.
    pub fn push_front(&mut self, class: TrackedClass) {
        debug_assert!(
            !self.by_tag.contains_key(&class.tag),
            "tag {} tracked twice",
            class.tag
        );

        let tag = class.tag;
        let slot = Slot::Occupied {
            class,
            next: self.head,
        };
        let index = match self.free {
            Some(index) => {
                if let Slot::Vacant { next_free } = self.slots[index] {
                    self.free = next_free;
                }
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.head = Some(index);
        self.by_tag.insert(tag, index);
    }

    /// Iterate records from the head.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor: self.head,
        }
    }

    /// Release every record.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.free = None;
        self.by_tag.clear();
    }

    /// Unlink every record for which `is_live` answers `false`.
    ///
    /// `is_live` is called exactly once per record, in chain order. Survivors
    /// keep their relative order. The returned [`DrainDead`] yields the
    /// unlinked records and releases their slots; dropping it early releases
    /// the rest.
    ///
    /// If `is_live` fails, the records unlinked so far are released and the
    /// error is returned. Records not yet examined stay tracked.
    pub fn drain_dead<F, E>(&mut self, mut is_live: F) -> Result<DrainDead<'_>, E>
    where
        F: FnMut(Tag) -> Result<bool, E>,
    {
        // `None` means the link being tracked is `self.head`.
        let mut link: Option<usize> = None;
        let mut cursor = self.head;
        let mut doomed: Option<usize> = None;

        while let Some(index) = cursor {
            let (tag, next) = self.occupied(index);
            let live = match is_live(tag) {
                Ok(live) => live,
                Err(err) => {
                    DrainDead {
                        registry: self,
                        cursor: doomed,
                    }
                    .for_each(drop);
                    return Err(err);
                }
            };

            if live {
                link = Some(index);
            } else {
                self.set_link(link, next);
                self.set_next(index, doomed);
                doomed = Some(index);
            }
            cursor = next;
        }

        Ok(DrainDead {
            registry: self,
            cursor: doomed,
        })
    }

    fn occupied(&self, index: usize) -> (Tag, Option<usize>) {
        match &self.slots[index] {
            Slot::Occupied { class, next } => (class.tag, *next),
            Slot::Vacant { .. } => unreachable!("chain reached vacant slot {index}"),
        }
    }

    fn set_link(&mut self, link: Option<usize>, target: Option<usize>) {
        match link {
            None => self.head = target,
            Some(index) => self.set_next(index, target),
        }
    }

    fn set_next(&mut self, index: usize, target: Option<usize>) {
        if let Slot::Occupied { next, .. } = &mut self.slots[index] {
            *next = target;
        }
    }

    fn release(&mut self, index: usize) -> (TrackedClass, Option<usize>) {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied { class, next } => {
                self.free = Some(index);
                self.by_tag.remove(&class.tag);
                (class, next)
            }
            Slot::Vacant { .. } => unreachable!("released vacant slot {index}"),
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a TrackedClass;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over tracked records, most recent first.
#[derive(Debug)]
pub struct Iter<'a> {
    registry: &'a Registry,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TrackedClass;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        match &self.registry.slots[index] {
            Slot::Occupied { class, next } => {
                self.cursor = *next;
                Some(class)
            }
            Slot::Vacant { .. } => None,
        }
    }
}

/// Records unlinked by [`Registry::drain_dead`].
///
/// Each record's slot is released as it is yielded.
#[derive(Debug)]
pub struct DrainDead<'a> {
    registry: &'a mut Registry,
    cursor: Option<usize>,
}

impl Iterator for DrainDead<'_> {
    type Item = TrackedClass;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let (class, next) = self.registry.release(index);
        self.cursor = next;
        Some(class)
    }
}

impl Drop for DrainDead<'_> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}
