//! Typed array buffers (§3): the flat, refcounted backing storage for all
//! coordinate, connectivity, and field data.
//!
//! An `Array<T>` wraps a shared buffer of plain-old-data elements. It never
//! copies on clone; cloning an `Array` shares the same backing storage,
//! matching the behaviour required when several objects reference the same
//! coordinate array (§4.2, shared vertex arrays). Every array carries a
//! globally unique [`Name`] (§3: "Has a globally unique name"), used by the
//! archive to deduplicate shared arrays across a saved object graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::name::Name;
use crate::types::ElementType;

/// Marker for types that may be stored in an [`Array`] and reinterpreted as
/// raw bytes. Implemented only for the fixed set of element types Vistle
/// arrays carry; never implement this for a type with padding or a
/// non-trivial destructor.
///
/// # Safety
/// A type implementing `Pod` must have no padding bytes and be valid for
/// any bit pattern of its size.
pub unsafe trait Pod: Copy + 'static {
    /// The element type tag this Rust type corresponds to on the wire.
    const ELEMENT_TYPE: ElementType;
}

unsafe impl Pod for u8 {
    const ELEMENT_TYPE: ElementType = ElementType::Byte;
}
unsafe impl Pod for i32 {
    const ELEMENT_TYPE: ElementType = ElementType::Int32;
}
unsafe impl Pod for i64 {
    const ELEMENT_TYPE: ElementType = ElementType::Int64;
}
unsafe impl Pod for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::Float32;
}
unsafe impl Pod for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::Float64;
}

/// Reinterprets a slice of `Pod` elements as raw little-endian-agnostic
/// bytes, for handing to a codec or the chunked-file writer. The host's
/// native byte order is used; callers that need a stable wire order must
/// byte-swap first (see `vistle_util::byteswap`).
pub fn cast_slice<T: Pod>(slice: &[T]) -> &[u8] {
    let len = std::mem::size_of_val(slice);
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, len) }
}

/// The inverse of [`cast_slice`]: reinterprets a raw byte buffer as a slice
/// of `Pod` elements. The byte length must be an exact multiple of
/// `size_of::<T>()`.
pub fn cast_slice_mut<T: Pod>(bytes: &mut [u8]) -> &mut [T] {
    assert_eq!(bytes.len() % std::mem::size_of::<T>(), 0, "byte length is not a multiple of element size");
    let len = bytes.len() / std::mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut T, len) }
}

/// Creator id used for arrays minted directly via [`Array::from_vec`]
/// rather than through a store allocation — e.g. in tests, or transient
/// arrays a module builds and never registers. Never collides with a real
/// module id (those are non-negative).
const ANONYMOUS_CREATOR: i32 = i32::MIN;

fn anonymous_name() -> Name {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Name::new(ANONYMOUS_CREATOR, COUNTER.fetch_add(1, Ordering::Relaxed))
}

struct Inner<T: Pod> {
    name: Name,
    data: Vec<T>,
}

/// A shared, refcounted, flat array of `T`. Clone is cheap: it shares the
/// underlying buffer rather than copying it, which is what lets the
/// deep-copy archive (§4.4) and the shared-memory store (§4.1) reference the
/// same coordinate array from multiple objects without duplicating it in
/// memory.
pub struct Array<T: Pod> {
    inner: Arc<Inner<T>>,
}

impl<T: Pod> Clone for Array<T> {
    fn clone(&self) -> Self {
        Array { inner: self.inner.clone() }
    }
}

impl<T: Pod> Array<T> {
    /// Wraps an owned `Vec<T>` as a shared array with a freshly minted
    /// anonymous name. Use [`Array::named`] when the array must carry an
    /// identity assigned by a store.
    pub fn from_vec(data: Vec<T>) -> Self {
        Array::named(anonymous_name(), data)
    }

    /// Wraps an owned `Vec<T>` under an explicit, caller-assigned name.
    pub fn named(name: Name, data: Vec<T>) -> Self {
        Array { inner: Arc::new(Inner { name, data }) }
    }

    /// This array's globally unique name.
    pub fn name(&self) -> &Name {
        &self.inner.name
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Borrows the array's contents.
    pub fn as_slice(&self) -> &[T] {
        &self.inner.data
    }

    /// The element type tag for `T`.
    pub fn element_type(&self) -> ElementType {
        T::ELEMENT_TYPE
    }

    /// Number of distinct owners of the backing buffer. Used by the store's
    /// eviction logic to decide whether an array may be reclaimed.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns a mutable view of the buffer if this is the only owner,
    /// mirroring `Arc::get_mut`'s uniqueness check; used while an object is
    /// still in its `Empty`/`Filled` construction states (§4.2) and no
    /// other handle can yet observe the array.
    pub fn get_mut(&mut self) -> Option<&mut Vec<T>> {
        Arc::get_mut(&mut self.inner).map(|inner| &mut inner.data)
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("name", &self.name())
            .field("len", &self.len())
            .field("element_type", &self.element_type())
            .finish()
    }
}

impl<T: Pod + PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.data == other.inner.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_backing_storage_and_name() {
        let a = Array::from_vec(vec![1.0f32, 2.0, 3.0]);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        assert_eq!(a.name(), b.name());
        assert_eq!(b.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn distinct_arrays_get_distinct_names() {
        let a = Array::from_vec(vec![1u8]);
        let b = Array::from_vec(vec![2u8]);
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn cast_slice_round_trips() {
        let v: Vec<f32> = vec![1.0, -2.5, 3.0];
        let bytes = cast_slice(&v);
        assert_eq!(bytes.len(), 12);
        let mut owned = bytes.to_vec();
        let back: &[f32] = cast_slice_mut(&mut owned);
        assert_eq!(back, &[1.0, -2.5, 3.0]);
    }

    #[test]
    fn get_mut_only_succeeds_when_unique() {
        let mut a = Array::from_vec(vec![1u8, 2, 3]);
        let b = a.clone();
        assert!(a.get_mut().is_none());
        drop(b);
        assert!(a.get_mut().is_some());
    }
}
