//! Shared state with change notification
//!
//! Views read the state synchronously and wait on [`Observable::subscribe`]
//! to learn when to read it again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;

/// State behind a lock plus a revision counter bumped on every update
#[derive(Debug)]
pub struct Observable<S> {
    state: Arc<RwLock<S>>,
    revision: Arc<watch::Sender<u64>>,
}

impl<S> Clone for Observable<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            revision: self.revision.clone(),
        }
    }
}

impl<S: Default> Default for Observable<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Observable<S> {
    pub fn new(state: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(state)),
            revision: Arc::new(revision),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read())
    }

    /// Mutate the state and notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.state.write());
        self.revision.send_modify(|r| *r += 1);
        result
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

/// Tracks which request is the current one so late answers to replaced
/// requests can be dropped
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    /// Start a new request, invalidating every earlier one
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}
