//! The object handle and its construction state machine (§4.2).
//!
//! An `Object` is a cheaply-cloneable, reference-counted handle over a
//! `TypeTag`-specific payload plus its metadata and attributes, following
//! the same shape as a GPU resource handle: an `Arc<Inner>` wrapper that
//! shares the backing data on clone while giving each handle independent
//! identity for refcounting (`ref_count`).

use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use crate::attributes::Attributes;
use crate::grids;
use crate::metadata::Metadata;
use crate::name::Name;
use crate::types::{Mapping, TypeTag};

/// The four construction states an object passes through, in order. No
/// transition is reversible (§4.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Just allocated; no payload arrays set yet.
    Empty,
    /// Payload arrays are set; attributes may still be added.
    Filled,
    /// Attributes are frozen; not yet visible to other modules.
    Finalized,
    /// Visible to downstream consumers. Fully immutable.
    Published,
}

/// Error returned when an invalid state transition is attempted, e.g.
/// publishing an object that was never finalized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidTransition {
    pub from: State,
    pub to: State,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot transition object from {:?} to {:?}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// The subtype-specific payload, tagged by [`TypeTag`]. The `Indexed`
/// variant covers the seven indexed-coordinate specializations (`Polygon`,
/// `Line`, `Points`, `Spheres`, `Tubes`, `Triangles`, `Quads`), which all
/// share [`grids::IndexedGrid`]'s shape and differ only in the tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Placeholder,
    Uniform(grids::Uniform),
    Rectilinear(grids::Rectilinear),
    Structured(grids::Structured),
    Unstructured(grids::Unstructured),
    Indexed(TypeTag, grids::IndexedGrid),
    Texture1D(grids::Texture1D),
    Vec(VecField),
}

/// The `Vec<T, N>` field payload: one to three component arrays mapped onto
/// a grid object, plus the mapping discriminant (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub struct VecField {
    pub components: SmallVec<[crate::array::Array<f64>; 3]>,
    pub grid: Object,
    pub mapping: Mapping,
}

struct Inner {
    tag: TypeTag,
    name: Name,
    state: Mutex<State>,
    kind: Mutex<Option<Kind>>,
    metadata: Mutex<Metadata>,
    attributes: Mutex<Attributes>,
}

/// A reference-counted handle to one object (§4.2). Cloning shares the same
/// underlying payload and state; it does not duplicate data, matching the
/// semantics of `clone(object)` delivering the same arrays to multiple
/// ports under different per-handle metadata views is *not* what this
/// clone does — see [`Object::derive`] for that operation.
#[derive(Clone)]
pub struct Object(Arc<Inner>);

impl Object {
    /// Allocates an empty shell for `tag`, in [`State::Empty`].
    pub fn empty(tag: TypeTag, name: Name) -> Object {
        Object(Arc::new(Inner {
            tag,
            name,
            state: Mutex::new(State::Empty),
            kind: Mutex::new(None),
            metadata: Mutex::new(Metadata::default()),
            attributes: Mutex::new(Attributes::new()),
        }))
    }

    /// Constructs a fully-payloaded object directly in [`State::Filled`];
    /// the common path used by module code that builds a result in one
    /// shot rather than filling an empty shell incrementally.
    pub fn construct(name: Name, metadata: Metadata, kind: Kind) -> Object {
        let tag = kind.tag();
        Object(Arc::new(Inner {
            tag,
            name,
            state: Mutex::new(State::Filled),
            kind: Mutex::new(Some(kind)),
            metadata: Mutex::new(metadata),
            attributes: Mutex::new(Attributes::new()),
        }))
    }

    /// The type tag of this object.
    pub fn tag(&self) -> TypeTag {
        self.0.tag
    }

    /// The object's unique name.
    pub fn name(&self) -> &Name {
        &self.0.name
    }

    /// Current construction state.
    pub fn state(&self) -> State {
        *self.0.state.lock().unwrap()
    }

    /// Number of live handles to this object, including this one. Used by
    /// the store to decide when an object's arrays may be reclaimed.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Fills an `Empty` shell's payload, transitioning to `Filled`.
    pub fn fill(&self, kind: Kind, metadata: Metadata) -> Result<(), InvalidTransition> {
        let mut state = self.0.state.lock().unwrap();
        if *state != State::Empty {
            return Err(InvalidTransition { from: *state, to: State::Filled });
        }
        *self.0.kind.lock().unwrap() = Some(kind);
        *self.0.metadata.lock().unwrap() = metadata;
        *state = State::Filled;
        Ok(())
    }

    /// Sets an attribute. Only legal while `Filled` (before `Finalized`).
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), InvalidTransition> {
        let state = *self.0.state.lock().unwrap();
        if state != State::Filled {
            return Err(InvalidTransition { from: state, to: State::Finalized });
        }
        self.0.attributes.lock().unwrap().set(key, value);
        Ok(())
    }

    /// Freezes attributes, transitioning `Filled` -> `Finalized`.
    pub fn finalize(&self) -> Result<(), InvalidTransition> {
        let mut state = self.0.state.lock().unwrap();
        if *state != State::Filled {
            return Err(InvalidTransition { from: *state, to: State::Finalized });
        }
        *state = State::Finalized;
        Ok(())
    }

    /// Makes the object visible to other modules, transitioning
    /// `Finalized` -> `Published`. Metadata fields set before this call
    /// happen-before any consumer's observation of the object (§5).
    pub fn publish(&self) -> Result<(), InvalidTransition> {
        let mut state = self.0.state.lock().unwrap();
        if *state != State::Finalized {
            return Err(InvalidTransition { from: *state, to: State::Published });
        }
        *state = State::Published;
        Ok(())
    }

    /// A read-only snapshot of the current metadata.
    pub fn metadata(&self) -> Metadata {
        self.0.metadata.lock().unwrap().clone()
    }

    /// A read-only snapshot of the current attributes.
    pub fn attributes(&self) -> Attributes {
        self.0.attributes.lock().unwrap().clone()
    }

    /// Returns a clone of the payload if present (i.e. at least `Filled`).
    pub fn kind(&self) -> Option<Kind> {
        self.0.kind.lock().unwrap().clone()
    }

    /// Downcasts to the `Uniform` payload, or `None` if this object's tag
    /// does not match or it has no payload yet.
    pub fn as_uniform(&self) -> Option<grids::Uniform> {
        match self.kind()? {
            Kind::Uniform(u) => Some(u),
            _ => None,
        }
    }

    /// Downcasts to the `Unstructured` payload.
    pub fn as_unstructured(&self) -> Option<grids::Unstructured> {
        match self.kind()? {
            Kind::Unstructured(u) => Some(u),
            _ => None,
        }
    }

    /// Downcasts to an indexed-coordinate payload (`Polygon`, `Line`,
    /// `Points`, `Spheres`, `Tubes`, `Triangles`, `Quads`).
    pub fn as_indexed(&self) -> Option<grids::IndexedGrid> {
        match self.kind()? {
            Kind::Indexed(_, g) => Some(g),
            _ => None,
        }
    }

    /// Downcasts to the `Vec<T, N>` field payload.
    pub fn as_vec_field(&self) -> Option<VecField> {
        match self.kind()? {
            Kind::Vec(v) => Some(v),
            _ => None,
        }
    }

    /// Produces a new object that shares this object's referenced arrays
    /// (via the cheap `Array`/`Object` clones inside `Kind`) but carries
    /// its own metadata and a freshly minted name; used when the same data
    /// must be delivered to multiple ports tagged with different
    /// block/timestep metadata (§4.2 `clone(object)`).
    pub fn derive(&self, name: Name, metadata: Metadata) -> Object {
        Object(Arc::new(Inner {
            tag: self.0.tag,
            name,
            state: Mutex::new(State::Filled),
            kind: Mutex::new(self.0.kind.lock().unwrap().clone()),
            metadata: Mutex::new(metadata),
            attributes: Mutex::new(Attributes::new()),
        }))
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object").field("name", &self.0.name).field("tag", &self.0.tag).field("state", &self.state()).finish()
    }
}

impl Kind {
    /// The type tag this payload corresponds to.
    pub fn tag(&self) -> TypeTag {
        match self {
            Kind::Placeholder => TypeTag::Placeholder,
            Kind::Uniform(_) => TypeTag::Uniform,
            Kind::Rectilinear(_) => TypeTag::Rectilinear,
            Kind::Structured(_) => TypeTag::Structured,
            Kind::Unstructured(_) => TypeTag::Unstructured,
            Kind::Indexed(tag, _) => *tag,
            Kind::Texture1D(_) => TypeTag::Texture1D,
            Kind::Vec(v) => match v.components.len() {
                1 => TypeTag::Vec1,
                2 => TypeTag::Vec2,
                _ => TypeTag::Vec3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::NameGenerator;

    fn uniform_kind() -> Kind {
        Kind::Uniform(grids::Uniform {
            axes: [
                grids::Axis { min: 0.0, max: 1.0, divisions: 2 },
                grids::Axis { min: 0.0, max: 1.0, divisions: 2 },
                grids::Axis { min: 0.0, max: 1.0, divisions: 2 },
            ],
        })
    }

    #[test]
    fn state_machine_enforces_order() {
        let names = NameGenerator::new(1);
        let obj = Object::empty(TypeTag::Uniform, names.next_name());
        assert_eq!(obj.state(), State::Empty);
        assert!(obj.finalize().is_err());
        obj.fill(uniform_kind(), Metadata::default()).unwrap();
        assert_eq!(obj.state(), State::Filled);
        obj.set_attribute("k", "v").unwrap();
        obj.finalize().unwrap();
        assert!(obj.set_attribute("k2", "v2").is_err());
        obj.publish().unwrap();
        assert_eq!(obj.state(), State::Published);
        assert!(obj.publish().is_err());
    }

    #[test]
    fn derive_shares_payload_with_new_metadata() {
        let names = NameGenerator::new(1);
        let obj = Object::construct(names.next_name(), Metadata::default(), uniform_kind());
        let mut md = Metadata::default();
        md.block = 3;
        let derived = obj.derive(names.next_name(), md.clone());
        assert_ne!(obj.name(), derived.name());
        assert_eq!(derived.metadata().block, 3);
        assert_eq!(derived.as_uniform(), obj.as_uniform());
    }

    #[test]
    fn downcast_returns_none_on_tag_mismatch() {
        let names = NameGenerator::new(1);
        let obj = Object::construct(names.next_name(), Metadata::default(), uniform_kind());
        assert!(obj.as_unstructured().is_none());
    }
}
