//! Deep-copy archive loading (§4.4, §4.5): the inverse of [`crate::save`].
//! Reconstructs an object graph from a [`Directory`] plus a root
//! [`ObjectRecord`], decompressing each array/sub-object at most once and
//! sharing the result across every referrer, exactly as it was shared
//! before saving.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use byteorder::{ReadBytesExt, LE};

use vistle_codec::decompress;
use vistle_core::array::{cast_slice_mut, Pod};
use vistle_core::grids::{self, Axis};
use vistle_core::object::{Kind, VecField};
use vistle_core::{Array, ElementType, Metadata, Name, NameGenerator, Object, TypeTag};
use vistle_util::byteswap::ByteSwap;

use crate::directory::Directory;
use crate::error::ArchiveError;
use crate::record::decode_record;
use crate::save::decode_mapping_tag;

/// Any one of the five concrete array element types, erased so a single
/// cache can hold them regardless of `T`.
#[derive(Clone)]
enum AnyArray {
    Byte(Array<u8>),
    Int32(Array<i32>),
    Int64(Array<i64>),
    Float32(Array<f32>),
    Float64(Array<f64>),
}

/// Pairs a `Pod` type with its `AnyArray` variant, so [`DeepArchiveLoader`]
/// can stay generic over element type while still caching through one map.
/// The `ByteSwap` bound lets `load_array` normalize a freshly-decompressed
/// payload from its on-disk little-endian order to the host's.
trait ErasedArray: Pod + ByteSwap {
    fn wrap(array: Array<Self>) -> AnyArray;
    fn unwrap(any: AnyArray) -> Option<Array<Self>>;
}

impl ErasedArray for u8 {
    fn wrap(array: Array<Self>) -> AnyArray {
        AnyArray::Byte(array)
    }
    fn unwrap(any: AnyArray) -> Option<Array<Self>> {
        match any {
            AnyArray::Byte(a) => Some(a),
            _ => None,
        }
    }
}
impl ErasedArray for i32 {
    fn wrap(array: Array<Self>) -> AnyArray {
        AnyArray::Int32(array)
    }
    fn unwrap(any: AnyArray) -> Option<Array<Self>> {
        match any {
            AnyArray::Int32(a) => Some(a),
            _ => None,
        }
    }
}
impl ErasedArray for i64 {
    fn wrap(array: Array<Self>) -> AnyArray {
        AnyArray::Int64(array)
    }
    fn unwrap(any: AnyArray) -> Option<Array<Self>> {
        match any {
            AnyArray::Int64(a) => Some(a),
            _ => None,
        }
    }
}
impl ErasedArray for f32 {
    fn wrap(array: Array<Self>) -> AnyArray {
        AnyArray::Float32(array)
    }
    fn unwrap(any: AnyArray) -> Option<Array<Self>> {
        match any {
            AnyArray::Float32(a) => Some(a),
            _ => None,
        }
    }
}
impl ErasedArray for f64 {
    fn wrap(array: Array<Self>) -> AnyArray {
        AnyArray::Float64(array)
    }
    fn unwrap(any: AnyArray) -> Option<Array<Self>> {
        match any {
            AnyArray::Float64(a) => Some(a),
            _ => None,
        }
    }
}

/// How names are assigned to reconstructed arrays/objects.
pub enum Renaming<'a> {
    /// Reuse the names recorded in the archive verbatim.
    Keep,
    /// Mint a fresh name per distinct archived name, via `generator`.
    Remint(&'a NameGenerator),
}

/// Reconstructs object graphs from a [`Directory`], caching every array and
/// sub-object by its archived name so a value shared by several referrers
/// is decompressed, and renamed, exactly once.
pub struct DeepArchiveLoader<'a> {
    directory: Directory,
    renaming: Renaming<'a>,
    objects: HashMap<Name, Object>,
    arrays: HashMap<Name, AnyArray>,
    translation: HashMap<Name, Name>,
}

impl<'a> DeepArchiveLoader<'a> {
    pub fn new(directory: Directory, renaming: Renaming<'a>) -> Self {
        DeepArchiveLoader { directory, renaming, objects: HashMap::new(), arrays: HashMap::new(), translation: HashMap::new() }
    }

    /// Adds one more entry to this loader's directory. Lets a streaming
    /// reader (e.g. the chunked file reader) grow the directory as it
    /// scans a file, while retaining the arrays/objects already
    /// materialized in this loader's cache.
    pub fn insert_entry(&mut self, entry: crate::directory::DirectoryEntry) {
        self.directory.insert(entry);
    }

    /// Whether `name` already has a directory entry.
    pub fn has_entry(&self, name: &Name) -> bool {
        self.directory.contains(name)
    }

    fn translate(&mut self, archived: &Name) -> Name {
        if let Some(existing) = self.translation.get(archived) {
            return existing.clone();
        }
        let assigned = match &self.renaming {
            Renaming::Keep => archived.clone(),
            Renaming::Remint(gen) => gen.next_name(),
        };
        self.translation.insert(archived.clone(), assigned.clone());
        assigned
    }

    /// Loads the object named `root` plus everything it transitively
    /// references. `root` must be present in the directory as a
    /// sub-object entry (i.e. it was reached as a `Vec` field's grid by
    /// some other object during save) — callers loading a *root* archive
    /// object typically hold its [`crate::record::ObjectRecord`]
    /// separately and should call [`DeepArchiveLoader::load_record`]
    /// instead.
    pub fn load(&mut self, root: &Name) -> Result<Object, ArchiveError> {
        self.load_object(root)
    }

    /// Loads an object from an already-decoded record (the usual entry
    /// point: the caller read the root record itself, outside the
    /// directory, and now wants its payload materialized).
    pub fn load_record(&mut self, name: &Name, record: &crate::record::ObjectRecord) -> Result<Object, ArchiveError> {
        self.build_object(name, record)
    }

    fn load_object(&mut self, name: &Name) -> Result<Object, ArchiveError> {
        if let Some(obj) = self.objects.get(name) {
            return Ok(obj.clone());
        }
        let entry = self.directory.get(name).ok_or_else(|| ArchiveError::MissingEntry(name.clone()))?.clone();
        if entry.is_array {
            return Err(ArchiveError::Malformed(format!("{name} is an array entry, not a sub-object")));
        }
        let bytes = decompress(entry.compression_mode, &entry.compressed_bytes, entry.uncompressed_size, 1)?;
        let record = decode_record(&bytes)?;
        self.build_object(name, &record)
    }

    fn build_object(&mut self, archived_name: &Name, record: &crate::record::ObjectRecord) -> Result<Object, ArchiveError> {
        let kind = self.load_kind(record.tag, &record.payload, &record.refs)?;
        let final_name = self.translate(archived_name);
        let object = Object::construct(final_name, record.metadata.clone(), kind);
        for (k, v) in record.attributes.iter() {
            object.set_attribute(k.to_string(), v.to_string()).expect("freshly constructed object is Filled");
        }
        object.finalize().expect("freshly constructed object is Filled");
        self.objects.insert(archived_name.clone(), object.clone());
        Ok(object)
    }

    fn load_kind(&mut self, tag: TypeTag, payload: &[u8], refs: &[Name]) -> Result<Kind, ArchiveError> {
        match tag {
            TypeTag::Placeholder => Ok(Kind::Placeholder),
            TypeTag::Uniform => Ok(Kind::Uniform(grids::Uniform { axes: read_axes(payload)? })),
            TypeTag::Rectilinear => {
                let [x, y, z] = require_refs::<3>(refs, "Rectilinear")?;
                Ok(Kind::Rectilinear(grids::Rectilinear {
                    x: self.load_array::<f64>(x)?,
                    y: self.load_array::<f64>(y)?,
                    z: self.load_array::<f64>(z)?,
                }))
            }
            TypeTag::Structured => {
                let dims = read_dims(payload)?;
                let [x, y, z] = require_refs::<3>(refs, "Structured")?;
                Ok(Kind::Structured(grids::Structured {
                    dims,
                    x: self.load_array::<f64>(x)?,
                    y: self.load_array::<f64>(y)?,
                    z: self.load_array::<f64>(z)?,
                }))
            }
            TypeTag::Unstructured => {
                let [eo, conn, tpe, ghost, x, y, z] = require_refs::<7>(refs, "Unstructured")?;
                Ok(Kind::Unstructured(grids::Unstructured {
                    element_offsets: self.load_array::<i64>(eo)?,
                    connectivity: self.load_array::<i64>(conn)?,
                    type_per_element: self.load_array::<u8>(tpe)?,
                    ghost: self.load_array::<u8>(ghost)?,
                    x: self.load_array::<f64>(x)?,
                    y: self.load_array::<f64>(y)?,
                    z: self.load_array::<f64>(z)?,
                }))
            }
            TypeTag::Polygon | TypeTag::Line | TypeTag::Points | TypeTag::Spheres | TypeTag::Tubes | TypeTag::Triangles | TypeTag::Quads => {
                let has_radius = payload.first().copied().unwrap_or(0) != 0;
                let expected = if has_radius { 6 } else { 5 };
                if refs.len() != expected {
                    return Err(ArchiveError::Malformed(format!("{:?} record expects {expected} refs, found {}", tag, refs.len())));
                }
                let radius = if has_radius { Some(self.load_array::<f64>(&refs[5])?) } else { None };
                Ok(Kind::Indexed(
                    tag,
                    grids::IndexedGrid {
                        element_offsets: self.load_array::<i64>(&refs[0])?,
                        connectivity: self.load_array::<i64>(&refs[1])?,
                        x: self.load_array::<f64>(&refs[2])?,
                        y: self.load_array::<f64>(&refs[3])?,
                        z: self.load_array::<f64>(&refs[4])?,
                        radius,
                    },
                ))
            }
            TypeTag::Texture1D => {
                let [color_table, coordinates] = require_refs::<2>(refs, "Texture1D")?;
                Ok(Kind::Texture1D(grids::Texture1D {
                    color_table: self.load_array::<u8>(color_table)?,
                    coordinates: self.load_array::<f32>(coordinates)?,
                }))
            }
            TypeTag::Vec1 | TypeTag::Vec2 | TypeTag::Vec3 => {
                let mapping = decode_mapping_tag(payload.first().copied().unwrap_or(2));
                let num_components = match tag {
                    TypeTag::Vec1 => 1,
                    TypeTag::Vec2 => 2,
                    _ => 3,
                };
                if refs.len() != num_components + 1 {
                    return Err(ArchiveError::Malformed(format!("{:?} record expects {} refs, found {}", tag, num_components + 1, refs.len())));
                }
                let mut components = smallvec::SmallVec::new();
                for name in &refs[..num_components] {
                    components.push(self.load_array::<f64>(name)?);
                }
                let grid = self.load_object(&refs[num_components])?;
                Ok(Kind::Vec(VecField { components, grid, mapping }))
            }
        }
    }

    fn load_array<T: ErasedArray>(&mut self, archived_name: &Name) -> Result<Array<T>, ArchiveError> {
        if let Some(any) = self.arrays.get(archived_name).cloned() {
            return T::unwrap(any).ok_or_else(|| ArchiveError::Malformed(format!("{archived_name} was reused with a different element type")));
        }
        let entry = self.directory.get(archived_name).ok_or_else(|| ArchiveError::MissingEntry(archived_name.clone()))?.clone();
        if !entry.is_array {
            return Err(ArchiveError::Malformed(format!("{archived_name} is a sub-object entry, not an array")));
        }
        match entry.element_type {
            Some(et) if et == T::ELEMENT_TYPE => {}
            Some(other) => {
                return Err(ArchiveError::Malformed(format!("{archived_name} is stored as {other:?}, not {:?}", T::ELEMENT_TYPE)));
            }
            None => return Err(ArchiveError::Malformed(format!("{archived_name} has no recorded element type"))),
        }
        let mut raw = decompress(entry.compression_mode, &entry.compressed_bytes, entry.uncompressed_size, T::ELEMENT_TYPE.size_of())?;
        let data: &mut [T] = cast_slice_mut::<T>(&mut raw);
        #[cfg(target_endian = "big")]
        vistle_util::byteswap::swap_slice(data);
        let data = data.to_vec();
        let final_name = self.translate(archived_name);
        let array = Array::named(final_name, data);
        self.arrays.insert(archived_name.clone(), T::wrap(array.clone()));
        Ok(array)
    }
}

fn require_refs<const N: usize>(refs: &[Name], what: &'static str) -> Result<[&Name; N], ArchiveError> {
    if refs.len() != N {
        return Err(ArchiveError::Malformed(format!("{what} record expects {N} refs, found {}", refs.len())));
    }
    let mut out = [&refs[0]; N];
    out.copy_from_slice(&refs.iter().collect::<Vec<_>>());
    Ok(out)
}

fn read_axes(payload: &[u8]) -> Result<[Axis; 3], ArchiveError> {
    let mut cur = Cursor::new(payload);
    let mut read_one = || -> std::io::Result<Axis> {
        let min = cur.read_f64::<LE>()?;
        let max = cur.read_f64::<LE>()?;
        let divisions = cur.read_u32::<LE>()?;
        Ok(Axis { min, max, divisions })
    };
    let a = read_one().map_err(axis_err)?;
    let b = read_one().map_err(axis_err)?;
    let c = read_one().map_err(axis_err)?;
    Ok([a, b, c])
}

fn axis_err(e: std::io::Error) -> ArchiveError {
    ArchiveError::Malformed(format!("truncated Uniform axes payload: {e}"))
}

fn read_dims(payload: &[u8]) -> Result<[u32; 3], ArchiveError> {
    let mut cur = Cursor::new(payload);
    let mut dims = [0u32; 3];
    for d in &mut dims {
        *d = cur.read_u32::<LE>().map_err(|e| ArchiveError::Malformed(format!("truncated Structured dims payload: {e}")))?;
    }
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_codec::CompressionMode;
    use vistle_core::name::NameGenerator as CoreNameGenerator;
    use vistle_core::object::VecField as CoreVecField;
    use vistle_core::Mapping;

    use crate::save::DeepArchiveSaver;

    #[test]
    fn rectilinear_round_trips_with_names_kept() {
        let names = CoreNameGenerator::new(1);
        let kind = Kind::Rectilinear(grids::Rectilinear {
            x: Array::from_vec(vec![0.0, 1.0]),
            y: Array::from_vec(vec![0.0, 2.0]),
            z: Array::from_vec(vec![0.0, 3.0]),
        });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind.clone());
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        let directory = saver.into_directory();

        let mut loader = DeepArchiveLoader::new(directory, Renaming::Keep);
        let loaded = loader.load_record(obj.name(), &record).unwrap();
        assert_eq!(loaded.name(), obj.name());
        assert_eq!(loaded.as_uniform(), None);
        let r = match loaded.kind().unwrap() {
            Kind::Rectilinear(r) => r,
            _ => panic!("expected Rectilinear"),
        };
        assert_eq!(r.x.as_slice(), &[0.0, 1.0]);
        assert_eq!(r.z.as_slice(), &[0.0, 3.0]);
    }

    #[test]
    fn remint_assigns_fresh_names_consistently() {
        let names = CoreNameGenerator::new(1);
        let shared = Array::from_vec(vec![1.0, 2.0]);
        let kind = Kind::Rectilinear(grids::Rectilinear { x: shared.clone(), y: shared.clone(), z: shared });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind);
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        let directory = saver.into_directory();

        let loader_names = CoreNameGenerator::new(2);
        let mut loader = DeepArchiveLoader::new(directory, Renaming::Remint(&loader_names));
        let loaded = loader.load_record(obj.name(), &record).unwrap();
        assert_ne!(loaded.name(), obj.name());
        let r = match loaded.kind().unwrap() {
            Kind::Rectilinear(r) => r,
            _ => panic!("expected Rectilinear"),
        };
        assert_eq!(r.x.name(), r.y.name());
        assert_eq!(r.x.name(), r.z.name());
        assert_ne!(r.x.name(), shared_name(&record));
    }

    fn shared_name(record: &crate::record::ObjectRecord) -> &Name {
        &record.refs[0]
    }

    #[test]
    fn vec_field_round_trips_through_its_grid_sub_object() {
        let names = CoreNameGenerator::new(1);
        let grid_kind = Kind::Rectilinear(grids::Rectilinear {
            x: Array::from_vec(vec![0.0, 1.0]),
            y: Array::from_vec(vec![0.0, 1.0]),
            z: Array::from_vec(vec![0.0, 1.0]),
        });
        let grid = Object::construct(names.next_name(), Metadata::default(), grid_kind);
        let kind = Kind::Vec(CoreVecField {
            components: smallvec::smallvec![Array::from_vec(vec![5.0, 6.0])],
            grid,
            mapping: Mapping::Element,
        });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind);
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        let directory = saver.into_directory();

        let mut loader = DeepArchiveLoader::new(directory, Renaming::Keep);
        let loaded = loader.load_record(obj.name(), &record).unwrap();
        let v = loaded.as_vec_field().unwrap();
        assert_eq!(v.mapping, Mapping::Element);
        assert_eq!(v.components[0].as_slice(), &[5.0, 6.0]);
        assert!(v.grid.as_uniform().is_none());
    }
}
