//! Result of an unload pass.

use std::collections::HashSet;

/// Initial capacity of an [`UnloadedClasses`] collection.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 10;

/// Signatures of the classes an unload pass found dead.
///
/// The collection is owned by the caller. Element order follows deletion
/// order but is not part of the contract: treat it as a set. An empty
/// collection is the normal "nothing unloaded" outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnloadedClasses {
    signatures: Vec<String>,
}

impl UnloadedClasses {
    /// Create an empty collection with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_CAPACITY)
    }

    /// Create an empty collection that can hold `capacity` signatures
    /// without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            signatures: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, signature: String) {
        self.signatures.push(signature);
    }

    /// Number of unloaded classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Number of signatures the collection can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.signatures.capacity()
    }

    /// `true` if nothing was unloaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// `true` if `signature` was reported.
    #[must_use]
    pub fn contains(&self, signature: &str) -> bool {
        self.signatures.iter().any(|s| s == signature)
    }

    /// Iterate the reported signatures.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.signatures.iter()
    }

    /// Borrow the signatures as a set.
    #[must_use]
    pub fn as_set(&self) -> HashSet<&str> {
        self.signatures.iter().map(String::as_str).collect()
    }

    /// Take ownership of the signatures.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.signatures
    }
}

impl IntoIterator for UnloadedClasses {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.into_iter()
    }
}

impl<'a> IntoIterator for &'a UnloadedClasses {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.iter()
    }
}
