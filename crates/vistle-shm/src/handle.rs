//! Store handles (§4.1): thin `Arc`-wrapped views over an entry's payload,
//! in the same shape as a GPU resource handle — cloning a handle shares the
//! entry rather than copying its bytes.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vistle_core::{ElementType, Name, Object};

/// What an [`Entry`] holds: either the raw bytes of an allocated array, or
/// an object shell/handle.
pub(crate) enum Payload {
    Array { element_type: ElementType, bytes: Vec<u8> },
    Object(Object),
}

/// One store entry: a name's payload plus its store-level reference count.
/// This refcount is independent of any `Arc::strong_count` on the entry
/// itself — it is the explicit count the store contract (§4.1) describes,
/// incremented and decremented by name via `Store::increment`/`decrement`,
/// since a name may be referenced by another stored object without the
/// referencing code holding a live `Arc` to this entry.
pub(crate) struct Entry {
    pub name: Name,
    pub refcount: AtomicUsize,
    pub payload: Mutex<Payload>,
}

impl Entry {
    pub fn new_array(name: Name, element_type: ElementType, bytes: Vec<u8>) -> Entry {
        Entry { name, refcount: AtomicUsize::new(1), payload: Mutex::new(Payload::Array { element_type, bytes }) }
    }

    pub fn new_object(name: Name, object: Object) -> Entry {
        Entry { name, refcount: AtomicUsize::new(1), payload: Mutex::new(Payload::Object(object)) }
    }
}

/// An untyped raw handle to one store entry.
#[derive(Clone)]
pub struct RawHandle(pub(crate) Arc<Entry>);

impl RawHandle {
    /// The name this handle refers to.
    pub fn name(&self) -> &Name {
        &self.0.name
    }

    /// The store-level reference count (see [`Entry`]'s doc comment for why
    /// this differs from `Arc::strong_count`).
    pub fn ref_count(&self) -> usize {
        self.0.refcount.load(Ordering::Acquire)
    }

    /// Whether this entry holds an array payload.
    pub fn is_array(&self) -> bool {
        matches!(*self.0.payload.lock().unwrap(), Payload::Array { .. })
    }

    /// The element type if this is an array entry.
    pub fn element_type(&self) -> Option<ElementType> {
        match &*self.0.payload.lock().unwrap() {
            Payload::Array { element_type, .. } => Some(*element_type),
            Payload::Object(_) => None,
        }
    }

    /// A copy of the raw bytes if this is an array entry.
    pub fn array_bytes(&self) -> Option<Vec<u8>> {
        match &*self.0.payload.lock().unwrap() {
            Payload::Array { bytes, .. } => Some(bytes.clone()),
            Payload::Object(_) => None,
        }
    }

    /// The object handle if this is an object entry.
    pub fn object(&self) -> Option<Object> {
        match &*self.0.payload.lock().unwrap() {
            Payload::Object(obj) => Some(obj.clone()),
            Payload::Array { .. } => None,
        }
    }

    /// Replaces the object payload, used once a freshly `allocate_object`'d
    /// shell is filled in place.
    pub fn set_object(&self, object: Object) {
        *self.0.payload.lock().unwrap() = Payload::Object(object);
    }
}

impl Deref for RawHandle {
    type Target = Entry;
    fn deref(&self) -> &Entry {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_core::NameGenerator;

    #[test]
    fn array_handle_reports_its_payload() {
        let names = NameGenerator::new(1);
        let entry = Arc::new(Entry::new_array(names.next_name(), ElementType::Float32, vec![0u8; 16]));
        let handle = RawHandle(entry);
        assert!(handle.is_array());
        assert_eq!(handle.element_type(), Some(ElementType::Float32));
        assert_eq!(handle.array_bytes().unwrap().len(), 16);
        assert_eq!(handle.ref_count(), 1);
    }
}
