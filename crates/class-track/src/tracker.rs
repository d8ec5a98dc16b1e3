//! The class tracker.
//!
//! On startup every prepared class is put in a registry, tagged in a private
//! oracle session with a fresh tag. Class-prepare events add to the registry
//! as they arrive. After one or more unload notifications the tracker asks
//! the oracle, record by record, whether anything still carries each tag;
//! records whose tag has no live holder are the unloaded classes.
//!
//! Tags are never retagged or reused. Relying on the oracle avoids holding a
//! weak reference per class.
//!
//! Every operation takes `&mut self`. When the tracker is shared with event
//! threads it must live behind the agent's handler lock, see
//! [`HandlerLock`](crate::HandlerLock).

use std::time::Instant;

use crate::config::TrackerConfig;
use crate::error::{HostOp, HostResultExt, Result, TrackError};
use crate::host::{ClassEnumerator, LivenessOracle, TagSession};
use crate::metrics::{PassStats, TrackerMetrics};
use crate::output::UnloadedClasses;
use crate::registry::{Registry, TrackedClass};
use crate::tag::{Tag, TagAllocator};

/// Tracks prepared classes so unloaded ones can be named.
pub struct ClassTracker<E, O>
where
    E: ClassEnumerator,
    O: LivenessOracle<E::Class>,
{
    enumerator: E,
    oracle: O,
    session: Option<O::Session>,
    registry: Registry,
    tags: TagAllocator,
    config: TrackerConfig,
    metrics: TrackerMetrics,
    pending_unloads: usize,
    poisoned: bool,
}

impl<E, O> ClassTracker<E, O>
where
    E: ClassEnumerator,
    O: LivenessOracle<E::Class>,
{
    /// Create an uninitialized tracker with the default configuration.
    pub fn new(enumerator: E, oracle: O) -> Self {
        Self::with_config(enumerator, oracle, TrackerConfig::default())
    }

    /// Create an uninitialized tracker.
    pub fn with_config(enumerator: E, oracle: O, config: TrackerConfig) -> Self {
        Self {
            enumerator,
            oracle,
            session: None,
            registry: Registry::new(),
            tags: TagAllocator::new(),
            config,
            metrics: TrackerMetrics::new(),
            pending_unloads: 0,
            poisoned: false,
        }
    }

    /// Open the tracking session and track every prepared or array class
    /// currently loaded, in enumeration order.
    ///
    /// Must run before event delivery starts, and only once per
    /// [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// [`TrackError::AlreadyInitialized`] if called twice. Any host failure
    /// is unrecoverable and poisons the tracker.
    pub fn initialize(&mut self) -> Result<()> {
        self.check_usable()?;
        if self.session.is_some() {
            return Err(TrackError::AlreadyInitialized);
        }

        #[cfg(feature = "tracing")]
        let _span = crate::tracing::internal::trace_initialize();

        let result = self.populate();
        self.poison_on(result)
    }

    fn populate(&mut self) -> Result<()> {
        self.registry.clear();
        self.session = Some(self.oracle.open_session().during(HostOp::OpenSession)?);

        let loaded = self
            .enumerator
            .loaded_classes()
            .during(HostOp::LoadedClasses)?;
        let wanted = self.config.wanted_status;

        for entry in &loaded {
            if entry.status.intersects(wanted) {
                self.track(&entry.class)?;
            }
        }

        #[cfg(feature = "tracing")]
        crate::tracing::internal::log_initialized(loaded.len(), self.registry.len());

        Ok(())
    }

    /// Track a class that just finished preparing.
    ///
    /// The caller must hold the handler lock and must not add a class twice.
    /// Returns the tag assigned to the class.
    ///
    /// # Errors
    ///
    /// [`TrackError::NotInitialized`] before [`initialize`](Self::initialize).
    /// [`TrackError::DuplicateClass`] if duplicate checking is enabled and
    /// the class is already tagged. Host failures and duplicates are
    /// unrecoverable and poison the tracker.
    pub fn add_prepared_class(&mut self, class: &E::Class) -> Result<Tag> {
        self.check_usable()?;
        if self.session.is_none() {
            return Err(TrackError::NotInitialized);
        }

        let result = self.track(class);
        self.poison_on(result)
    }

    fn track(&mut self, class: &E::Class) -> Result<Tag> {
        let session = self.session.as_mut().ok_or(TrackError::NotInitialized)?;

        if self.config.check_duplicates {
            if let Some(tag) = session.tag_of(class).during(HostOp::GetTag)? {
                return Err(TrackError::DuplicateClass { tag });
            }
        }

        let tag = self.tags.allocate();
        let signature = self
            .enumerator
            .signature_of(class)
            .during(HostOp::Signature)?;
        session.set_tag(class, tag).during(HostOp::SetTag)?;

        #[cfg(feature = "tracing")]
        crate::tracing::internal::log_class_tracked(tag, &signature);

        self.registry.push_front(TrackedClass::new(tag, signature));
        Ok(tag)
    }

    /// Record that the host delivered an unload notification.
    ///
    /// Notifications carry no payload; they only mean a pass is due.
    pub fn note_unload(&mut self) {
        self.pending_unloads += 1;
    }

    /// Unload notifications received since the last pass.
    #[must_use]
    pub const fn pending_unloads(&self) -> usize {
        self.pending_unloads
    }

    /// Run an unload pass if any notification is pending.
    ///
    /// Returns `None` when no notification arrived since the last pass.
    ///
    /// # Errors
    ///
    /// Same as [`process_unloads`](Self::process_unloads), whether or not a
    /// notification is pending.
    pub fn process_pending_unloads(&mut self) -> Result<Option<UnloadedClasses>> {
        self.check_usable()?;
        if self.session.is_none() {
            return Err(TrackError::NotInitialized);
        }
        if self.pending_unloads == 0 {
            return Ok(None);
        }
        self.process_unloads().map(Some)
    }

    /// Remove every tracked class whose tag no longer has a live holder and
    /// return their signatures.
    ///
    /// One oracle query per tracked class. The result is unordered; an empty
    /// result means nothing was unloaded. Clears the pending notification
    /// count.
    ///
    /// # Errors
    ///
    /// [`TrackError::NotInitialized`] before [`initialize`](Self::initialize).
    /// [`TrackError::InconsistentTags`] if a tag has more than one live
    /// holder. Both that and host failures poison the tracker.
    pub fn process_unloads(&mut self) -> Result<UnloadedClasses> {
        self.check_usable()?;
        let Some(session) = self.session.as_ref() else {
            return Err(TrackError::NotInitialized);
        };

        let start = Instant::now();
        let examined = self.registry.len();

        #[cfg(feature = "tracing")]
        let _span = crate::tracing::internal::trace_unload_pass(
            crate::tracing::PassId(self.metrics.unload_passes as u64 + 1),
            examined,
        );

        let mut unloaded = UnloadedClasses::with_capacity(self.config.output_capacity);
        let result = self
            .registry
            .drain_dead(|tag| Self::is_live(session, tag))
            .map(|dead| {
                for class in dead {
                    #[cfg(feature = "tracing")]
                    crate::tracing::internal::log_class_unloaded(class.signature());

                    unloaded.push(class.into_signature());
                }
            });
        self.poison_on(result)?;

        self.pending_unloads = 0;
        self.metrics.record_pass(PassStats {
            examined,
            unloaded: unloaded.len(),
            duration: start.elapsed(),
        });

        #[cfg(feature = "tracing")]
        crate::tracing::internal::log_pass_end(examined, unloaded.len());

        Ok(unloaded)
    }

    fn is_live(session: &O::Session, tag: Tag) -> Result<bool> {
        match session.live_count(tag).during(HostOp::LiveCount)? {
            0 => Ok(false),
            1 => Ok(true),
            count => Err(TrackError::InconsistentTags { tag, count }),
        }
    }

    /// Release every tracked class and close the tracking session.
    ///
    /// Leaves the tracker ready for [`initialize`](Self::initialize). The tag
    /// sequence continues where it left off. Clears a poisoned state. A
    /// no-op on a tracker that was never initialized.
    ///
    /// # Errors
    ///
    /// Returns the host failure if the session could not be closed. Records
    /// are released regardless.
    pub fn reset(&mut self) -> Result<()> {
        #[cfg(feature = "tracing")]
        crate::tracing::internal::log_reset(self.registry.len());

        self.registry.clear();
        self.pending_unloads = 0;
        self.poisoned = false;

        match self.session.take() {
            Some(session) => session.close().during(HostOp::CloseSession),
            None => Ok(()),
        }
    }

    fn check_usable(&self) -> Result<()> {
        if self.poisoned {
            Err(TrackError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn poison_on<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_unrecoverable() {
                #[cfg(feature = "tracing")]
                crate::tracing::internal::log_unrecoverable(err);

                self.poisoned = true;
            }
        }
        result
    }

    /// `true` between [`initialize`](Self::initialize) and
    /// [`reset`](Self::reset).
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// `true` after an unrecoverable error, until [`reset`](Self::reset).
    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Number of tracked classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// `true` if no class is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// `true` if a class with `tag` is tracked.
    #[must_use]
    pub fn is_tracked(&self, tag: Tag) -> bool {
        self.registry.contains(tag)
    }

    /// Signature of the class tracked under `tag`.
    #[must_use]
    pub fn signature(&self, tag: Tag) -> Option<&str> {
        self.registry.get(tag).map(TrackedClass::signature)
    }

    /// Iterate tracked classes, most recently added first.
    pub fn tracked(&self) -> impl Iterator<Item = &TrackedClass> + '_ {
        self.registry.iter()
    }

    /// Most recently allocated tag.
    #[must_use]
    pub const fn last_tag(&self) -> Option<Tag> {
        self.tags.last()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Snapshot of the tracker's statistics.
    #[must_use]
    pub fn metrics(&self) -> TrackerMetrics {
        TrackerMetrics {
            classes_tracked: self.registry.len(),
            tags_allocated: self.tags.allocated(),
            ..self.metrics
        }
    }

    /// The class enumerator this tracker was built with.
    pub const fn enumerator(&self) -> &E {
        &self.enumerator
    }

    /// The liveness oracle this tracker was built with.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<E, O> std::fmt::Debug for ClassTracker<E, O>
where
    E: ClassEnumerator,
    O: LivenessOracle<E::Class>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassTracker")
            .field("initialized", &self.session.is_some())
            .field("tracked", &self.registry.len())
            .field("last_tag", &self.tags.last())
            .field("pending_unloads", &self.pending_unloads)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}
