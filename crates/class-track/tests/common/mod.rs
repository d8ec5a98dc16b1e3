//! In-memory VM used to drive the tracker in tests.
//!
//! Classes are loaded with a signature and status, and can be unloaded
//! later. Each tag session keeps its own tag table, and liveness queries
//! count loaded classes carrying the tag. Any host call can be made to fail,
//! and extra phantom holders can be attached to a tag to corrupt a session.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use class_track::{
    ClassEnumerator, ClassStatus, ClassTracker, HostError, HostErrorKind, HostOp, LivenessOracle,
    LoadedClass, Tag, TagSession, TrackerConfig,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

#[derive(Debug)]
struct FakeClass {
    signature: String,
    status: ClassStatus,
    loaded: bool,
}

#[derive(Debug, Default)]
struct VmState {
    classes: Vec<FakeClass>,
    failing: HashSet<HostOp>,
    next_session: usize,
    open_sessions: HashSet<usize>,
    phantom_holders: HashMap<(usize, Tag), usize>,
    live_queries: usize,
}

impl VmState {
    fn check(&self, op: HostOp) -> Result<(), HostError> {
        if self.failing.contains(&op) {
            Err(HostError::new(HostErrorKind::Internal, format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

/// Shared handle to the fake VM. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct FakeVm {
    state: Arc<Mutex<VmState>>,
}

pub type FakeTracker = ClassTracker<FakeVm, FakeVm>;

impl FakeVm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a prepared class.
    pub fn load(&self, signature: &str) -> ClassId {
        self.load_with_status(signature, ClassStatus::VERIFIED | ClassStatus::PREPARED)
    }

    pub fn load_with_status(&self, signature: &str, status: ClassStatus) -> ClassId {
        let mut state = self.state.lock();
        state.classes.push(FakeClass {
            signature: signature.to_string(),
            status,
            loaded: true,
        });
        ClassId(state.classes.len() - 1)
    }

    /// Make `class` unreachable. Its tags stop being reported live.
    pub fn unload(&self, class: ClassId) {
        self.state.lock().classes[class.0].loaded = false;
    }

    /// Make every subsequent `op` call fail.
    pub fn fail(&self, op: HostOp) {
        self.state.lock().failing.insert(op);
    }

    pub fn heal(&self, op: HostOp) {
        self.state.lock().failing.remove(&op);
    }

    /// Pretend `count` extra live objects carry `tag` in every open session.
    pub fn add_phantom_holders(&self, tag: Tag, count: usize) {
        let mut state = self.state.lock();
        let sessions: Vec<usize> = state.open_sessions.iter().copied().collect();
        for session in sessions {
            *state.phantom_holders.entry((session, tag)).or_default() += count;
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().open_sessions.len()
    }

    pub fn live_queries(&self) -> usize {
        self.state.lock().live_queries
    }

    pub fn tracker(&self) -> FakeTracker {
        ClassTracker::new(self.clone(), self.clone())
    }

    pub fn tracker_with(&self, config: TrackerConfig) -> FakeTracker {
        ClassTracker::with_config(self.clone(), self.clone(), config)
    }
}

impl ClassEnumerator for FakeVm {
    type Class = ClassId;

    fn loaded_classes(&self) -> Result<Vec<LoadedClass<ClassId>>, HostError> {
        let state = self.state.lock();
        state.check(HostOp::LoadedClasses)?;
        Ok(state
            .classes
            .iter()
            .enumerate()
            .filter(|(_, class)| class.loaded)
            .map(|(index, class)| LoadedClass::new(ClassId(index), class.status))
            .collect())
    }

    fn signature_of(&self, class: &ClassId) -> Result<String, HostError> {
        let state = self.state.lock();
        state.check(HostOp::Signature)?;
        state
            .classes
            .get(class.0)
            .filter(|class| class.loaded)
            .map(|class| class.signature.clone())
            .ok_or_else(|| HostError::new(HostErrorKind::InvalidClass, "no such class"))
    }
}

impl LivenessOracle<ClassId> for FakeVm {
    type Session = FakeSession;

    fn open_session(&self) -> Result<FakeSession, HostError> {
        let mut state = self.state.lock();
        state.check(HostOp::OpenSession)?;
        let id = state.next_session;
        state.next_session += 1;
        state.open_sessions.insert(id);
        Ok(FakeSession {
            id,
            state: Arc::clone(&self.state),
            tags: HashMap::new(),
        })
    }
}

/// Tag namespace private to one tracker.
#[derive(Debug)]
pub struct FakeSession {
    id: usize,
    state: Arc<Mutex<VmState>>,
    tags: HashMap<ClassId, Tag>,
}

impl TagSession<ClassId> for FakeSession {
    fn set_tag(&mut self, class: &ClassId, tag: Tag) -> Result<(), HostError> {
        self.state.lock().check(HostOp::SetTag)?;
        self.tags.insert(*class, tag);
        Ok(())
    }

    fn tag_of(&self, class: &ClassId) -> Result<Option<Tag>, HostError> {
        self.state.lock().check(HostOp::GetTag)?;
        Ok(self.tags.get(class).copied())
    }

    fn live_count(&self, tag: Tag) -> Result<usize, HostError> {
        let mut state = self.state.lock();
        state.check(HostOp::LiveCount)?;
        state.live_queries += 1;
        let live = self
            .tags
            .iter()
            .filter(|(class, t)| **t == tag && state.classes[class.0].loaded)
            .count();
        let phantom = state
            .phantom_holders
            .get(&(self.id, tag))
            .copied()
            .unwrap_or(0);
        Ok(live + phantom)
    }

    fn close(self) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.check(HostOp::CloseSession)?;
        state.open_sessions.remove(&self.id);
        Ok(())
    }
}

/// Signatures currently tracked, as a set.
pub fn tracked_set(tracker: &FakeTracker) -> HashSet<String> {
    tracker
        .tracked()
        .map(|class| class.signature().to_string())
        .collect()
}

pub fn set_of(signatures: &[&str]) -> HashSet<String> {
    signatures.iter().map(|s| (*s).to_string()).collect()
}
