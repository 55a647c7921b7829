use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::Result;

/// Lifecycle of one persisted user action (a meal save, a favorite toggle, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStatus {
    #[default]
    Idle,
    Pending,
    Committed,
    Failed,
}

/// What a call to [`SelectionStateTracker::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The persistence call ran and succeeded.
    Committed,
    /// An earlier submission for the key is still in flight; nothing was sent.
    AlreadyPending,
    /// The key was already committed; nothing was sent.
    AlreadyCommitted,
}

/// Per-key `Idle → Pending → Committed | Failed` state machine.
///
/// At most one persistence call is outstanding per key: submitting while a key is
/// Pending (or after it committed) returns immediately without calling anything.
/// Locks are never held across an await.
pub struct SelectionStateTracker<K> {
    states: Mutex<HashMap<K, SelectionStatus>>,
}

impl<K> Default for SelectionStateTracker<K> {
    fn default() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> SelectionStateTracker<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, SelectionStatus>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current status; keys never touched are Idle.
    pub fn status_of(&self, key: &K) -> SelectionStatus {
        self.lock().get(key).copied().unwrap_or_default()
    }

    /// Run `call` for `key` unless the key is Pending or Committed.
    ///
    /// On failure the key moves to Failed and the error is returned unchanged.
    /// A Failed key may be submitted again.
    pub async fn submit<F, Fut>(&self, key: K, call: F) -> Result<Submission>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        {
            let mut states = self.lock();
            match states.get(&key) {
                Some(SelectionStatus::Pending) => {
                    debug!(?key, "submission already in flight");
                    return Ok(Submission::AlreadyPending);
                }
                Some(SelectionStatus::Committed) => {
                    debug!(?key, "already committed");
                    return Ok(Submission::AlreadyCommitted);
                }
                _ => {}
            }
            states.insert(key.clone(), SelectionStatus::Pending);
        }

        let guard = PendingGuard {
            tracker: self,
            key,
            armed: true,
        };
        let outcome = call().await;
        let key = guard.disarm();

        let mut states = self.lock();
        match outcome {
            Ok(()) => {
                states.insert(key, SelectionStatus::Committed);
                Ok(Submission::Committed)
            }
            Err(e) => {
                debug!(?key, error = %e, "submission failed");
                states.insert(key, SelectionStatus::Failed);
                Err(e)
            }
        }
    }

    /// Failed → Idle. Returns false for any other state.
    pub fn acknowledge_failure(&self, key: &K) -> bool {
        let mut states = self.lock();
        if states.get(key) == Some(&SelectionStatus::Failed) {
            states.remove(key);
            true
        } else {
            false
        }
    }

    /// Drop a resolved entry so the key can start a new lifecycle.
    ///
    /// Pending entries are left alone.
    pub fn release(&self, key: &K) -> bool {
        let mut states = self.lock();
        match states.get(key) {
            Some(SelectionStatus::Committed | SelectionStatus::Failed) => {
                states.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn committed_keys(&self) -> Vec<K> {
        self.lock()
            .iter()
            .filter(|(_, status)| **status == SelectionStatus::Committed)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Returns an abandoned Pending key to Idle if the submit future is dropped mid-call.
struct PendingGuard<'a, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    tracker: &'a SelectionStateTracker<K>,
    key: K,
    armed: bool,
}

impl<K> PendingGuard<'_, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn disarm(mut self) -> K {
        self.armed = false;
        self.key.clone()
    }
}

impl<K> Drop for PendingGuard<'_, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut states = self.tracker.lock();
        if states.get(&self.key) == Some(&SelectionStatus::Pending) {
            states.remove(&self.key);
        }
    }
}
