//! Subtype-specific payloads for each object type tag (§4.2).
//!
//! Each struct here holds exactly the arrays and scalar parameters its type
//! tag's schema (see [`crate::schema`]) calls for. They are assembled into
//! an [`crate::object::Object`] by the registry, never constructed loose.

use crate::array::Array;
use crate::types::CellType;

/// One axis of a `Uniform` grid: `divisions` vertices spaced evenly between
/// `min` and `max`. Vertex and cell coordinates are computed on demand, not
/// stored (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub divisions: u32,
}

impl Axis {
    /// Coordinate of vertex `i` along this axis, `0 <= i < divisions`. A
    /// degenerate axis (`divisions <= 1`) is still treated as two vertices,
    /// `min` at `i == 0` and `max` at `i == 1`, so it contributes one cell
    /// rather than collapsing to a single point.
    pub fn vertex(&self, i: u32) -> f64 {
        if self.divisions <= 1 {
            return if i == 0 { self.min } else { self.max };
        }
        let t = i as f64 / (self.divisions - 1) as f64;
        self.min + t * (self.max - self.min)
    }

    /// Number of cells along this axis. A degenerate axis (`divisions <= 1`)
    /// still produces one cell, between its two `vertex` endpoints.
    pub fn cells(&self) -> u32 {
        self.divisions.saturating_sub(1).max(1)
    }
}

/// A uniform rectangular grid: axis-aligned, evenly spaced in each
/// dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    pub axes: [Axis; 3],
}

impl Uniform {
    /// Total number of vertices, the product of each axis's divisions.
    pub fn num_vertices(&self) -> u64 {
        self.axes.iter().map(|a| a.divisions as u64).product()
    }

    /// Total number of cells, the product of each axis's cell count.
    pub fn num_cells(&self) -> u64 {
        self.axes.iter().map(|a| a.cells() as u64).product()
    }

    /// Flattens a cell's `(i, j, k)` index into its linear cell index, `i`
    /// fastest — the cell-grid analogue of `Structured::linear_index`.
    pub fn cell_index(&self, i: u32, j: u32, k: u32) -> usize {
        let (ni, nj) = (self.axes[0].cells() as usize, self.axes[1].cells() as usize);
        i as usize + ni * (j as usize + nj * k as usize)
    }
}

/// A grid whose coordinates are separable per axis but not necessarily
/// evenly spaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectilinear {
    pub x: Array<f64>,
    pub y: Array<f64>,
    pub z: Array<f64>,
}

impl Rectilinear {
    pub fn num_vertices(&self) -> u64 {
        self.x.len() as u64 * self.y.len() as u64 * self.z.len() as u64
    }
}

/// A curvilinear grid: explicit `(x, y, z)` coordinates for every vertex,
/// addressed with `i, j, k` indexing where `i` varies fastest (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub struct Structured {
    pub dims: [u32; 3],
    pub x: Array<f64>,
    pub y: Array<f64>,
    pub z: Array<f64>,
}

impl Structured {
    /// Flattens `(i, j, k)` into the linear vertex index, `i` fastest.
    pub fn linear_index(&self, i: u32, j: u32, k: u32) -> usize {
        let (ni, nj) = (self.dims[0] as usize, self.dims[1] as usize);
        i as usize + ni * (j as usize + nj * k as usize)
    }
}

/// Unstructured connectivity: per-element type, a flat connectivity array,
/// and offsets delimiting each element's slice of it. `Polyhedron` elements
/// encode their faces inline in the connectivity stream (§4.2): a face
/// vertex count followed by that many vertex indices, repeated once per
/// face, for as many faces as the element has.
#[derive(Clone, Debug, PartialEq)]
pub struct Unstructured {
    pub element_offsets: Array<i64>,
    pub connectivity: Array<i64>,
    pub type_per_element: Array<u8>,
    pub ghost: Array<u8>,
    pub x: Array<f64>,
    pub y: Array<f64>,
    pub z: Array<f64>,
}

impl Unstructured {
    /// Number of elements (one less than the offsets array length).
    pub fn num_elements(&self) -> usize {
        self.element_offsets.len().saturating_sub(1)
    }

    /// The cell type of element `idx`.
    pub fn cell_type(&self, idx: usize) -> CellType {
        decode_cell_type(self.type_per_element.as_slice()[idx])
    }

    /// Whether element `idx` is a ghost cell (authoritative connectivity,
    /// excluded only from ownership-partition reductions; see §4.2).
    pub fn is_ghost(&self, idx: usize) -> bool {
        self.ghost.as_slice().get(idx).copied().unwrap_or(0) != 0
    }

    /// The connectivity slice for element `idx`, honoring the
    /// face-stream encoding for `Polyhedron` (the slice includes the
    /// interleaved face-size markers, uninterpreted).
    pub fn element_connectivity(&self, idx: usize) -> &[i64] {
        let offsets = self.element_offsets.as_slice();
        let (start, end) = (offsets[idx] as usize, offsets[idx + 1] as usize);
        &self.connectivity.as_slice()[start..end]
    }

    /// Decodes a `Polyhedron` element's face stream into one vertex-index
    /// slice per face. A face that repeats its first vertex as a closing
    /// terminator decodes fine as-is: the repeat is just that face's last
    /// entry, already included in its leading count.
    pub fn faces(&self, idx: usize) -> PolyhedronFaces<'_> {
        PolyhedronFaces { stream: self.element_connectivity(idx), pos: 0 }
    }
}

/// Iterator over a `Polyhedron` element's faces, returned by
/// [`Unstructured::faces`]. Each item is one face's vertex indices.
pub struct PolyhedronFaces<'a> {
    stream: &'a [i64],
    pos: usize,
}

impl<'a> Iterator for PolyhedronFaces<'a> {
    type Item = &'a [i64];

    fn next(&mut self) -> Option<Self::Item> {
        let count = *self.stream.get(self.pos)? as usize;
        let start = self.pos + 1;
        let end = start + count;
        if end > self.stream.len() {
            return None;
        }
        self.pos = end;
        Some(&self.stream[start..end])
    }
}

/// Encodes a [`CellType`] to its on-disk byte tag. Stable across versions.
pub fn encode_cell_type(t: CellType) -> u8 {
    match t {
        CellType::None => 0,
        CellType::Point => 1,
        CellType::Bar => 2,
        CellType::Triangle => 3,
        CellType::Quad => 4,
        CellType::Tetrahedron => 5,
        CellType::Pyramid => 6,
        CellType::Prism => 7,
        CellType::Hexahedron => 8,
        CellType::Polyhedron => 9,
    }
}

/// Decodes a cell type byte tag; unrecognized values decode to `None`
/// rather than panicking, since a future format version may add cell
/// types this reader does not know.
pub fn decode_cell_type(b: u8) -> CellType {
    match b {
        1 => CellType::Point,
        2 => CellType::Bar,
        3 => CellType::Triangle,
        4 => CellType::Quad,
        5 => CellType::Tetrahedron,
        6 => CellType::Pyramid,
        7 => CellType::Prism,
        8 => CellType::Hexahedron,
        9 => CellType::Polyhedron,
        _ => CellType::None,
    }
}

/// Shared payload for the indexed-coordinate family: `Polygons`, `Lines`,
/// `Triangles`, `Quads`, `Points`, `Spheres`, `Tubes`. `Points` and
/// `Spheres` carry empty `element_offsets`/`connectivity` (every vertex is
/// its own element); the others use them like `Unstructured`'s 2D/1D
/// analogue.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedGrid {
    pub element_offsets: Array<i64>,
    pub connectivity: Array<i64>,
    pub x: Array<f64>,
    pub y: Array<f64>,
    pub z: Array<f64>,
    /// Per-vertex radius, only meaningful for `Spheres`/`Tubes`.
    pub radius: Option<Array<f64>>,
}

impl IndexedGrid {
    pub fn num_vertices(&self) -> usize {
        self.x.len()
    }

    pub fn num_elements(&self) -> usize {
        self.element_offsets.len().saturating_sub(1)
    }
}

/// A 1D color lookup table plus per-vertex coordinates into it (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub struct Texture1D {
    pub color_table: Array<u8>,
    pub coordinates: Array<f32>,
}
