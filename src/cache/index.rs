//! In-memory index of modules already materialized in this process

use crate::cache::key::CacheKey;
use crate::module::Module;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Maps cache keys to non-owning references of loaded modules.
///
/// Entries never keep a module alive. A record whose module has been dropped
/// everywhere else is removed the next time it is looked up.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    entries: Mutex<HashMap<CacheKey, Weak<Module>>>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the module for `key` if some owner still holds it
    pub fn lookup(&self, key: &CacheKey) -> Option<Arc<Module>> {
        let mut entries = self.entries();
        let live = entries.get(key)?.upgrade();
        if live.is_none() {
            entries.remove(key);
        }
        live
    }

    /// Record `module` under `key` without extending its lifetime
    pub fn insert(&self, key: CacheKey, module: &Arc<Module>) {
        self.entries().insert(key, Arc::downgrade(module));
    }

    /// Number of records, including ones not yet found to be stale
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Weak<Module>>> {
        // Nothing panics while the lock is held, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
