//! The agent's handler lock.
//!
//! [`ClassTracker`] does no locking of its own. The embedding agent guards
//! it, together with event delivery, with one coarse lock. `HandlerLock`
//! is that lock, built on `parking_lot::Mutex`.
//!
//! # Example
//!
//! ```ignore
//! use class_track::{ClassTracker, HandlerLock};
//!
//! let lock = HandlerLock::new(ClassTracker::new(vm.clone(), vm));
//! lock.with(ClassTracker::initialize)?;
//!
//! // class-prepare event thread
//! lock.add_prepared_class(&class)?;
//!
//! // class-unload event thread
//! lock.note_unload();
//! if let Some(unloaded) = lock.process_pending_unloads()? {
//!     report(unloaded);
//! }
//! ```

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::host::{ClassEnumerator, LivenessOracle};
use crate::output::UnloadedClasses;
use crate::tag::Tag;
use crate::tracker::ClassTracker;

/// Coarse lock serializing tracker operations with event delivery.
#[derive(Debug, Default)]
pub struct HandlerLock<T> {
    inner: Mutex<T>,
}

impl<T> HandlerLock<T> {
    /// Wrap `value` in a new lock.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquire the lock, blocking until it is available.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Try to acquire the lock without blocking.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Run `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// Mutable access without locking; the borrow proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consume the lock, returning the guarded value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<E, O> HandlerLock<ClassTracker<E, O>>
where
    E: ClassEnumerator,
    O: LivenessOracle<E::Class>,
{
    /// [`ClassTracker::add_prepared_class`] under the lock.
    ///
    /// # Errors
    ///
    /// See [`ClassTracker::add_prepared_class`].
    pub fn add_prepared_class(&self, class: &E::Class) -> Result<Tag> {
        self.lock().add_prepared_class(class)
    }

    /// [`ClassTracker::note_unload`] under the lock.
    pub fn note_unload(&self) {
        self.lock().note_unload();
    }

    /// [`ClassTracker::process_pending_unloads`] under the lock.
    ///
    /// # Errors
    ///
    /// See [`ClassTracker::process_unloads`].
    pub fn process_pending_unloads(&self) -> Result<Option<UnloadedClasses>> {
        self.lock().process_pending_unloads()
    }
}
