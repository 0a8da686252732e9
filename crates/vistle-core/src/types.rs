//! Closed enumerations used throughout the object model: object type tags,
//! array element types, unstructured cell types, and field mapping.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// The closed enumeration of object type tags (§3, §4.2).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TypeTag {
    Placeholder,
    Uniform,
    Rectilinear,
    Structured,
    Unstructured,
    Polygon,
    Line,
    Points,
    Spheres,
    Tubes,
    Triangles,
    Quads,
    Texture1D,
    Vec1,
    Vec2,
    Vec3,
}

impl TypeTag {
    /// Short identifier used in diagnostics and in the archive directory;
    /// stable across versions (part of the on-disk format).
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Placeholder => "Placeholder",
            TypeTag::Uniform => "UniformGrid",
            TypeTag::Rectilinear => "RectilinearGrid",
            TypeTag::Structured => "StructuredGrid",
            TypeTag::Unstructured => "UnstructuredGrid",
            TypeTag::Polygon => "Polygons",
            TypeTag::Line => "Lines",
            TypeTag::Points => "Points",
            TypeTag::Spheres => "Spheres",
            TypeTag::Tubes => "Tubes",
            TypeTag::Triangles => "Triangles",
            TypeTag::Quads => "Quads",
            TypeTag::Texture1D => "Texture1D",
            TypeTag::Vec1 => "Vec1",
            TypeTag::Vec2 => "Vec2",
            TypeTag::Vec3 => "Vec3",
        }
    }

    /// Stable on-disk byte tag; never renumber an existing variant.
    pub fn wire_tag(self) -> u8 {
        self as u8
    }

    /// Decodes a wire tag written by [`TypeTag::wire_tag`].
    pub fn from_wire_tag(tag: u8) -> Option<TypeTag> {
        TypeTag::ALL.iter().copied().find(|t| t.wire_tag() == tag)
    }

    /// All type tags, in a stable order; used to build the type registry.
    pub const ALL: &'static [TypeTag] = &[
        TypeTag::Placeholder,
        TypeTag::Uniform,
        TypeTag::Rectilinear,
        TypeTag::Structured,
        TypeTag::Unstructured,
        TypeTag::Polygon,
        TypeTag::Line,
        TypeTag::Points,
        TypeTag::Spheres,
        TypeTag::Tubes,
        TypeTag::Triangles,
        TypeTag::Quads,
        TypeTag::Texture1D,
        TypeTag::Vec1,
        TypeTag::Vec2,
        TypeTag::Vec3,
    ];
}

/// The scalar element type of an [`Array`](crate::array::Array).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ElementType {
    Byte,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ElementType {
    /// Size in bytes of one element.
    pub fn size_of(self) -> usize {
        match self {
            ElementType::Byte => 1,
            ElementType::Int32 => 4,
            ElementType::Int64 => 8,
            ElementType::Float32 => 4,
            ElementType::Float64 => 8,
        }
    }

    /// Whether this element type is a floating-point type (relevant for
    /// choosing a lossy codec).
    pub fn is_float(self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }
}

/// The closed enumeration of cell types for `Unstructured` connectivity
/// (§4.2).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum CellType {
    None,
    Point,
    Bar,
    Triangle,
    Quad,
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
    Polyhedron,
}

impl CellType {
    /// The fixed number of vertices this cell type consumes from the
    /// connectivity array, or `None` for types whose vertex count is
    /// variable (only `Polyhedron`, which uses the face-stream encoding).
    pub fn fixed_vertex_count(self) -> Option<usize> {
        match self {
            CellType::None => Some(0),
            CellType::Point => Some(1),
            CellType::Bar => Some(2),
            CellType::Triangle => Some(3),
            CellType::Quad => Some(4),
            CellType::Tetrahedron => Some(4),
            CellType::Pyramid => Some(5),
            CellType::Prism => Some(6),
            CellType::Hexahedron => Some(8),
            CellType::Polyhedron => None,
        }
    }
}

/// Whether a field's values are defined per vertex or per element (§4.2).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Mapping {
    Vertex,
    Element,
    Unspecified,
}

/// Store cache-mode choices (§4.1): how aggressively a consumer's retained
/// handle may be reclaimed once it is no longer strictly needed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum CacheMode {
    EvictImmediately,
    EvictLate,
    KeepUntilExecute,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_type_tags_have_names() {
        for &tag in TypeTag::ALL {
            assert!(!tag.name().is_empty());
        }
    }

    #[test]
    fn type_tag_wire_round_trips() {
        for &tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_wire_tag(tag.wire_tag()), Some(tag));
        }
    }

    #[test]
    fn hexahedron_has_eight_vertices() {
        assert_eq!(CellType::Hexahedron.fixed_vertex_count(), Some(8));
        assert_eq!(CellType::Polyhedron.fixed_vertex_count(), None);
    }
}
