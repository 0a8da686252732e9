//! The store's internal pool allocator (§4.1): partitions the arena into a
//! size class per element width and bump-allocates within each class,
//! compacting only when explicitly asked to.
//!
//! This process-local substrate does not actually map a byte arena the way
//! the original mmap-backed store would; it tracks capacity and
//! per-size-class usage so `OutOfSpace` and the memory-pressure warning
//! threshold behave the same way a real arena-backed allocator's would,
//! while the bytes themselves live in ordinary heap allocations owned by
//! each `Array`/`Object`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::StoreError;

/// Warn once usage crosses this fraction of capacity (§4.1: "the store may
/// proactively warn producers when memory pressure crosses a threshold").
const PRESSURE_WARN_THRESHOLD: f64 = 0.9;

#[derive(Default)]
struct ClassState {
    used_bytes: usize,
    high_water: usize,
}

/// A bump allocator bookkeeper, one per store, tracking total and
/// per-size-class usage against a fixed capacity.
pub struct Pool {
    capacity_bytes: usize,
    used_bytes: AtomicUsize,
    classes: Mutex<HashMap<usize, ClassState>>,
    warned: AtomicUsize,
}

impl Pool {
    /// Creates a pool with the given total byte capacity.
    pub fn new(capacity_bytes: usize) -> Pool {
        Pool {
            capacity_bytes,
            used_bytes: AtomicUsize::new(0),
            classes: Mutex::new(HashMap::new()),
            warned: AtomicUsize::new(0),
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity_bytes
    }

    /// Total bytes currently reserved across all size classes.
    pub fn used(&self) -> usize {
        self.used_bytes.load(Ordering::Acquire)
    }

    /// Fraction of capacity currently in use, in `[0.0, 1.0+]`.
    pub fn pressure(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return 0.0;
        }
        self.used() as f64 / self.capacity_bytes as f64
    }

    /// Reserves `bytes` from the size class keyed by `element_size` (e.g.
    /// `4` for `f32`/`i32`, `8` for `f64`/`i64`, `1` for byte arrays).
    /// Fails with `OutOfSpace` if capacity would be exceeded.
    pub fn reserve(&self, element_size: usize, bytes: usize) -> Result<(), StoreError> {
        let prev = self.used_bytes.fetch_add(bytes, Ordering::AcqRel);
        if prev + bytes > self.capacity_bytes {
            self.used_bytes.fetch_sub(bytes, Ordering::AcqRel);
            return Err(StoreError::OutOfSpace { requested_bytes: bytes });
        }
        let mut classes = self.classes.lock().unwrap();
        let entry = classes.entry(element_size).or_default();
        entry.used_bytes += bytes;
        entry.high_water = entry.high_water.max(entry.used_bytes);
        drop(classes);

        let pressure = self.pressure();
        if pressure >= PRESSURE_WARN_THRESHOLD && self.warned.swap(1, Ordering::AcqRel) == 0 {
            warn!(
                "store pool at {:.0}% of capacity ({} / {} bytes)",
                pressure * 100.0,
                self.used(),
                self.capacity_bytes
            );
        } else if pressure < PRESSURE_WARN_THRESHOLD {
            self.warned.store(0, Ordering::Release);
        }
        Ok(())
    }

    /// Releases `bytes` previously reserved from `element_size`'s class.
    pub fn release(&self, element_size: usize, bytes: usize) {
        self.used_bytes.fetch_sub(bytes, Ordering::AcqRel);
        let mut classes = self.classes.lock().unwrap();
        if let Some(entry) = classes.get_mut(&element_size) {
            entry.used_bytes = entry.used_bytes.saturating_sub(bytes);
        }
    }

    /// Drops bookkeeping for any size class that is fully unused, the only
    /// form of compaction this allocator performs (§4.1: "compacting only
    /// on explicit `shrink_to_fit`").
    pub fn shrink_to_fit(&self) {
        let mut classes = self.classes.lock().unwrap();
        classes.retain(|_, c| c.used_bytes > 0);
    }
}
