//! The shared-memory object store (§4.1).
//!
//! In a real deployment this is an `mmap`-backed region attached by every
//! local process in the group. Here it is realized as a process-local,
//! `Arc`-shared registry: `Store::create`/`Store::attach` resolve against a
//! process-global table keyed by store id, so every `Store` handle for the
//! same id shares the same entries, refcounts, and pool — which is the
//! observable contract this substrate needs to provide (see §4.1's note in
//! the expanded specification for why real cross-process `mmap` plumbing is
//! out of scope here).

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, OnceLock};

use vistle_core::array::{cast_slice, Pod};
use vistle_core::{Array, CacheMode, ElementType, Name, NameGenerator, Object, TypeTag};

use crate::error::StoreError;
use crate::handle::{Entry, Payload, RawHandle};
use crate::pool::Pool;

/// The ABI version this build of the store speaks. `attach` fails with
/// `Incompatible` if the caller expects a different version.
pub const STORE_ABI_VERSION: u32 = 1;

/// Default pool capacity for a newly created store: 256 MiB, a value
/// chosen to comfortably exceed this crate's test fixtures while still
/// exercising the `OutOfSpace` path when asked to.
pub const DEFAULT_CAPACITY_BYTES: usize = 256 * 1024 * 1024;

struct StoreInner {
    id: String,
    abi_version: u32,
    names: NameGenerator,
    entries: Mutex<HashMap<Name, Arc<Entry>>>,
    pool: Pool,
    cache_mode: Mutex<CacheMode>,
}

fn registry() -> &'static Mutex<HashMap<String, Arc<StoreInner>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<StoreInner>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A handle to the shared-memory store. Cheaply cloneable; all clones (and
/// all `attach`ed handles for the same store id) observe the same entries.
#[derive(Clone)]
pub struct Store(Arc<StoreInner>);

impl Store {
    /// Creates a new store under `store_id` with the given pool capacity
    /// and registers it so peers can `attach` to it. If `store_id` is
    /// already registered, attaches to the existing store instead (the
    /// first creator wins), matching "create if the caller is the
    /// designated owner" (§4.1) without a separate ownership token.
    pub fn create(store_id: impl Into<String>, creator: i32, capacity_bytes: usize) -> Store {
        let store_id = store_id.into();
        let mut reg = registry().lock().unwrap();
        if let Some(existing) = reg.get(&store_id) {
            return Store(existing.clone());
        }
        let inner = Arc::new(StoreInner {
            id: store_id.clone(),
            abi_version: STORE_ABI_VERSION,
            names: NameGenerator::new(creator),
            entries: Mutex::new(HashMap::new()),
            pool: Pool::new(capacity_bytes),
            cache_mode: Mutex::new(CacheMode::EvictLate),
        });
        reg.insert(store_id, inner.clone());
        Store(inner)
    }

    /// Attaches to an existing store, failing with `StoreMissing` if no
    /// owner has created it, or `Incompatible` if `expected_abi_version`
    /// does not match the store's ABI version.
    pub fn attach(store_id: &str, expected_abi_version: u32) -> Result<Store, StoreError> {
        let reg = registry().lock().unwrap();
        let inner = reg.get(store_id).ok_or_else(|| StoreError::StoreMissing(store_id.to_string()))?;
        if inner.abi_version != expected_abi_version {
            return Err(StoreError::Incompatible { expected: expected_abi_version, found: inner.abi_version });
        }
        Ok(Store(inner.clone()))
    }

    /// The store's id.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// The configured cache mode (§4.1).
    pub fn cache_mode(&self) -> CacheMode {
        *self.0.cache_mode.lock().unwrap()
    }

    /// Sets the cache mode consumers should honor when retaining handles.
    pub fn set_cache_mode(&self, mode: CacheMode) {
        *self.0.cache_mode.lock().unwrap() = mode;
    }

    /// Current pool memory pressure, in `[0.0, 1.0+]`.
    pub fn pool_pressure(&self) -> f64 {
        self.0.pool.pressure()
    }

    /// Allocates a fresh, name-tagged, refcount-1 array of `count`
    /// elements, zero-initialized.
    pub fn allocate_array<T: Pod + Default + Clone>(&self, count: usize) -> Result<(Name, Array<T>), StoreError> {
        let byte_len = count * std::mem::size_of::<T>();
        self.0.pool.reserve(std::mem::size_of::<T>(), byte_len)?;
        let name = self.0.names.next_name();
        let array = Array::named(name.clone(), vec![T::default(); count]);
        let bytes = cast_slice(array.as_slice()).to_vec();
        let entry = Arc::new(Entry::new_array(name.clone(), T::ELEMENT_TYPE, bytes));
        self.0.entries.lock().unwrap().insert(name.clone(), entry);
        Ok((name, array))
    }

    /// Allocates an empty object shell (§4.2 `State::Empty`), refcount 1.
    pub fn allocate_object(&self, tag: TypeTag) -> (Name, Object) {
        let name = self.0.names.next_name();
        let object = Object::empty(tag, name.clone());
        let entry = Arc::new(Entry::new_object(name.clone(), object.clone()));
        self.0.entries.lock().unwrap().insert(name.clone(), entry);
        (name, object)
    }

    /// Looks up `name` without adjusting its reference count.
    pub fn lookup(&self, name: &Name) -> Result<RawHandle, StoreError> {
        self.0
            .entries
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .map(RawHandle)
            .ok_or_else(|| StoreError::NotFound(name.clone()))
    }

    /// Atomically increments `name`'s reference count, returning the new
    /// value.
    pub fn increment(&self, name: &Name) -> Result<usize, StoreError> {
        let entries = self.0.entries.lock().unwrap();
        let entry = entries.get(name).ok_or_else(|| StoreError::NotFound(name.clone()))?;
        Ok(entry.refcount.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Atomically decrements `name`'s reference count. Reaching zero
    /// removes the entry and releases its pool reservation (if an array);
    /// referenced sub-objects and arrays held inside an `Object`'s payload
    /// are reclaimed by ordinary `Arc` drop once the entry's last `Object`
    /// clone is dropped, which realizes the "recursively decrements
    /// referenced entities" contract (§4.1) without the store needing to
    /// walk a separate reference graph.
    pub fn decrement(&self, name: &Name) -> Result<usize, StoreError> {
        let mut entries = self.0.entries.lock().unwrap();
        let new_count = {
            let entry = entries.get(name).ok_or_else(|| StoreError::NotFound(name.clone()))?;
            let prev = entry.refcount.fetch_sub(1, Ordering::AcqRel);
            prev.saturating_sub(1)
        };
        if new_count == 0 {
            if let Some(entry) = entries.remove(name) {
                if let Payload::Array { element_type, bytes } = &*entry.payload.lock().unwrap() {
                    self.0.pool.release(element_type.size_of(), bytes.len());
                }
            }
        }
        Ok(new_count)
    }

    /// Releases this process's view of the store. The store's registry
    /// entry and its content are unaffected; other attached handles keep
    /// working (§4.1: "does not affect stored content").
    pub fn detach(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_fails_for_unknown_store() {
        assert!(matches!(Store::attach("no-such-store", STORE_ABI_VERSION), Err(StoreError::StoreMissing(_))));
    }

    #[test]
    fn attach_detects_abi_mismatch() {
        let _store = Store::create("abi-test-store", 1, DEFAULT_CAPACITY_BYTES);
        let err = Store::attach("abi-test-store", STORE_ABI_VERSION + 1).unwrap_err();
        assert!(matches!(err, StoreError::Incompatible { .. }));
    }

    #[test]
    fn allocate_lookup_and_refcount_round_trip() {
        let store = Store::create("rc-test-store", 1, DEFAULT_CAPACITY_BYTES);
        let (name, array) = store.allocate_array::<f32>(4).unwrap();
        assert_eq!(array.len(), 4);
        let handle = store.lookup(&name).unwrap();
        assert_eq!(handle.ref_count(), 1);
        assert_eq!(store.increment(&name).unwrap(), 2);
        assert_eq!(store.decrement(&name).unwrap(), 1);
        assert_eq!(store.decrement(&name).unwrap(), 0);
        assert!(store.lookup(&name).is_err());
    }

    #[test]
    fn out_of_space_is_reported() {
        let store = Store::create("tiny-store", 1, 8);
        assert!(store.allocate_array::<f64>(2).is_err());
    }
}
