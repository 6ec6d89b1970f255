//! Per-key exclusion for fetch-and-place sequences
//!
//! The first caller for a key becomes the leader and holds a [`FetchGuard`];
//! later callers get the key's [`InFlight`] token and block on it until the
//! leader's guard is dropped. The table lock is only held for map updates.

use crate::cache::key::CacheKey;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Joinable marker for a fetch in progress
#[derive(Debug, Default)]
pub struct InFlight {
    done: Mutex<bool>,
    finished: Condvar,
}

impl InFlight {
    /// Block until the leader for this key has finished
    pub fn wait(&self) {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        while !*done {
            done = self
                .finished
                .wait(done)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn finish(&self) {
        *self.done.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.finished.notify_all();
    }
}

/// Result of claiming a key
pub enum Claim<'a> {
    /// Caller owns the key until the guard is dropped
    Leader(FetchGuard<'a>),
    /// Another caller owns the key
    Follower(Arc<InFlight>),
}

/// Table of keys currently being fetched
#[derive(Debug, Default)]
pub struct InFlightTable {
    slots: Mutex<HashMap<CacheKey, Arc<InFlight>>>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the leader for `key`, or get the token of the current leader
    pub fn claim(&self, key: &CacheKey) -> Claim<'_> {
        let mut slots = self.slots();
        if let Some(token) = slots.get(key) {
            return Claim::Follower(Arc::clone(token));
        }
        let token = Arc::new(InFlight::default());
        slots.insert(key.clone(), Arc::clone(&token));
        Claim::Leader(FetchGuard {
            table: self,
            key: key.clone(),
            token,
        })
    }

    /// Number of keys with a fetch in progress
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<InFlight>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leadership of one key; released on drop, including on error or panic
pub struct FetchGuard<'a> {
    table: &'a InFlightTable,
    key: CacheKey,
    token: Arc<InFlight>,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.table.slots().remove(&self.key);
        self.token.finish();
    }
}
