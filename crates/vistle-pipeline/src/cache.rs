//! The per-module result cache (§4.4): at most one concurrent computation
//! per key, shared by however many consumers ask for it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Condvar, Mutex};

enum Slot<V> {
    Pending,
    Ready(V),
}

/// A token returned by [`ResultCache::get_or_lock`]. `Some` means the
/// caller won the race to compute `key` and must eventually call
/// [`ResultCache::store_and_unlock`] or [`ResultCache::cancel`]; `None`
/// means another caller's value was returned instead.
pub struct CacheToken<K>(Option<K>);

impl<K> CacheToken<K> {
    /// Whether this token actually locked an entry (i.e. the cache was
    /// empty for that key and the caller must compute it).
    pub fn is_locking(&self) -> bool {
        self.0.is_some()
    }
}

/// Memoizes one value per `K`, ensuring at most one concurrent computation
/// per key across threads within a module (§4.4).
pub struct ResultCache<K, V> {
    state: Mutex<HashMap<K, Slot<V>>>,
    condvar: Condvar,
}

impl<K: Eq + Hash + Clone, V: Clone> Default for ResultCache<K, V> {
    fn default() -> Self {
        ResultCache { state: Mutex::new(HashMap::new()), condvar: Condvar::new() }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ResultCache<K, V> {
    pub fn new() -> Self {
        ResultCache::default()
    }

    /// If `key` already has a value, returns it immediately. Otherwise
    /// blocks until no other caller is computing `key`, then either
    /// returns the value a concurrent caller just stored, or claims the
    /// key itself (returned as a locking [`CacheToken`]) so the caller
    /// must compute and store it.
    pub fn get_or_lock(&self, key: &K) -> (Option<V>, CacheToken<K>) {
        let mut state = self.state.lock().unwrap();
        loop {
            match state.get(key) {
                Some(Slot::Ready(value)) => return (Some(value.clone()), CacheToken(None)),
                Some(Slot::Pending) => {
                    state = self.condvar.wait(state).unwrap();
                }
                None => {
                    state.insert(key.clone(), Slot::Pending);
                    return (None, CacheToken(Some(key.clone())));
                }
            }
        }
    }

    /// Associates `value` with the key a locking token claimed, and wakes
    /// any callers blocked on [`ResultCache::get_or_lock`] for that key.
    /// A non-locking token (from a cache hit) is a no-op.
    pub fn store_and_unlock(&self, token: CacheToken<K>, value: V) {
        if let Some(key) = token.0 {
            self.state.lock().unwrap().insert(key, Slot::Ready(value));
            self.condvar.notify_all();
        }
    }

    /// Releases a locking token without storing a value, e.g. because the
    /// computation failed. Any blocked waiters retry as if the key had
    /// never been claimed.
    pub fn cancel(&self, token: CacheToken<K>) {
        if let Some(key) = token.0 {
            self.state.lock().unwrap().remove(&key);
            self.condvar.notify_all();
        }
    }

    /// Evicts one key's cached value, e.g. because a producer's generation
    /// advanced (§4.3 cache-keyed reception).
    pub fn evict(&self, key: &K) {
        self.state.lock().unwrap().remove(key);
    }

    /// Evicts every cached value whose key satisfies `predicate`.
    pub fn evict_matching(&self, mut predicate: impl FnMut(&K) -> bool) {
        self.state.lock().unwrap().retain(|k, _| !predicate(k));
    }

    /// Drops every cached value (§4.1 cache-mode eviction).
    pub fn clear(&self) {
        self.state.lock().unwrap().clear();
    }
}
