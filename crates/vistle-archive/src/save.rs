//! Deep-copy archive saving (§4.4, §4.5): walks an object's payload,
//! compresses every referenced array exactly once, recurses into
//! referenced sub-objects, and accumulates everything into a [`Directory`]
//! keyed by name.

use std::io::Write;

use byteorder::{WriteBytesExt, LE};

use vistle_codec::{compress, CompressionMode, SpeedHint};
use vistle_core::array::{cast_slice, Pod};
use vistle_core::grids;
use vistle_core::object::Kind;
use vistle_core::{Array, Mapping, Name, Object};
use vistle_util::byteswap::ByteSwap;

use crate::directory::{Directory, DirectoryEntry};
use crate::error::ArchiveError;
use crate::record::{encode_record, ObjectRecord};

/// Saves object graphs into a [`Directory`], deduplicating any array or
/// sub-object reachable from more than one place so it is written exactly
/// once (§4.5).
pub struct DeepArchiveSaver {
    directory: Directory,
    compression_mode: CompressionMode,
    speed_hint: SpeedHint,
}

impl DeepArchiveSaver {
    /// Creates a saver that compresses every array with `compression_mode`.
    pub fn new(compression_mode: CompressionMode) -> Self {
        DeepArchiveSaver { directory: Directory::new(), compression_mode, speed_hint: SpeedHint::Balanced }
    }

    /// Saves `object`, returning its inline record. Arrays and sub-objects
    /// it references are added to the saver's directory as a side effect;
    /// call [`DeepArchiveSaver::into_directory`] once done to retrieve it.
    pub fn save(&mut self, object: &Object) -> Result<ObjectRecord, ArchiveError> {
        let kind = object
            .kind()
            .ok_or_else(|| ArchiveError::Malformed(format!("object {} has no payload to save", object.name())))?;
        let mut refs = Vec::new();
        let payload = self.save_kind(&kind, &mut refs)?;
        Ok(ObjectRecord {
            tag: object.tag(),
            metadata: object.metadata(),
            attributes: object.attributes(),
            refs,
            payload,
        })
    }

    /// Consumes the saver, returning the accumulated directory.
    pub fn into_directory(self) -> Directory {
        self.directory
    }

    /// A read-only view of the directory accumulated so far; used by a
    /// writer that wants to flush newly added entries to a backing file
    /// incrementally rather than waiting for the whole save to finish.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    fn save_kind(&mut self, kind: &Kind, refs: &mut Vec<Name>) -> Result<Vec<u8>, ArchiveError> {
        let mut payload = Vec::new();
        match kind {
            Kind::Placeholder => {}
            Kind::Uniform(u) => write_axes(&mut payload, &u.axes),
            Kind::Rectilinear(r) => {
                self.save_array(&r.x, refs)?;
                self.save_array(&r.y, refs)?;
                self.save_array(&r.z, refs)?;
            }
            Kind::Structured(s) => {
                for d in s.dims {
                    payload.write_u32::<LE>(d).unwrap();
                }
                self.save_array(&s.x, refs)?;
                self.save_array(&s.y, refs)?;
                self.save_array(&s.z, refs)?;
            }
            Kind::Unstructured(u) => {
                self.save_array(&u.element_offsets, refs)?;
                self.save_array(&u.connectivity, refs)?;
                self.save_array(&u.type_per_element, refs)?;
                self.save_array(&u.ghost, refs)?;
                self.save_array(&u.x, refs)?;
                self.save_array(&u.y, refs)?;
                self.save_array(&u.z, refs)?;
            }
            Kind::Indexed(_, g) => {
                payload.write_u8(g.radius.is_some() as u8).unwrap();
                self.save_array(&g.element_offsets, refs)?;
                self.save_array(&g.connectivity, refs)?;
                self.save_array(&g.x, refs)?;
                self.save_array(&g.y, refs)?;
                self.save_array(&g.z, refs)?;
                if let Some(radius) = &g.radius {
                    self.save_array(radius, refs)?;
                }
            }
            Kind::Texture1D(t) => {
                self.save_array(&t.color_table, refs)?;
                self.save_array(&t.coordinates, refs)?;
            }
            Kind::Vec(v) => {
                payload.write_u8(mapping_tag(v.mapping)).unwrap();
                for component in &v.components {
                    self.save_array(component, refs)?;
                }
                self.save_object(&v.grid, refs)?;
            }
        }
        Ok(payload)
    }

    fn save_array<T: Pod + ByteSwap>(&mut self, array: &Array<T>, refs: &mut Vec<Name>) -> Result<(), ArchiveError> {
        let name = array.name().clone();
        if !self.directory.contains(&name) {
            let raw = little_endian_bytes(array.as_slice());
            let compressed = compress(self.compression_mode, &raw, T::ELEMENT_TYPE.size_of(), self.speed_hint)?;
            trace!("archived array {name} ({} -> {} bytes)", raw.len(), compressed.len());
            self.directory.insert(DirectoryEntry {
                name: name.clone(),
                is_array: true,
                element_type: Some(T::ELEMENT_TYPE),
                uncompressed_size: raw.len(),
                compression_mode: self.compression_mode,
                compressed_bytes: compressed,
            });
        }
        refs.push(name);
        Ok(())
    }

    fn save_object(&mut self, object: &Object, refs: &mut Vec<Name>) -> Result<(), ArchiveError> {
        let name = object.name().clone();
        if !self.directory.contains(&name) {
            let record = self.save(object)?;
            let encoded = encode_record(&record);
            let compressed = compress(self.compression_mode, &encoded, 1, self.speed_hint)?;
            self.directory.insert(DirectoryEntry {
                name: name.clone(),
                is_array: false,
                element_type: None,
                uncompressed_size: encoded.len(),
                compression_mode: self.compression_mode,
                compressed_bytes: compressed,
            });
        }
        refs.push(name);
        Ok(())
    }
}

/// Reinterprets `data` as bytes in the on-disk little-endian order. A no-op
/// copy on a little-endian host; byte-swaps a scratch copy first on a
/// big-endian one.
fn little_endian_bytes<T: Pod + ByteSwap>(data: &[T]) -> Vec<u8> {
    #[cfg(target_endian = "little")]
    {
        cast_slice(data).to_vec()
    }
    #[cfg(target_endian = "big")]
    {
        let mut owned = data.to_vec();
        vistle_util::byteswap::swap_slice(&mut owned);
        cast_slice(&owned).to_vec()
    }
}

fn write_axes(w: &mut impl Write, axes: &[grids::Axis; 3]) {
    for axis in axes {
        w.write_f64::<LE>(axis.min).unwrap();
        w.write_f64::<LE>(axis.max).unwrap();
        w.write_u32::<LE>(axis.divisions).unwrap();
    }
}

pub(crate) fn mapping_tag(m: Mapping) -> u8 {
    match m {
        Mapping::Vertex => 0,
        Mapping::Element => 1,
        Mapping::Unspecified => 2,
    }
}

pub(crate) fn decode_mapping_tag(b: u8) -> Mapping {
    match b {
        0 => Mapping::Vertex,
        1 => Mapping::Element,
        _ => Mapping::Unspecified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_core::metadata::Metadata;
    use vistle_core::name::NameGenerator;
    use vistle_core::object::VecField;

    #[test]
    fn saving_rectilinear_records_three_arrays() {
        let names = NameGenerator::new(1);
        let kind = Kind::Rectilinear(grids::Rectilinear {
            x: Array::from_vec(vec![0.0, 1.0]),
            y: Array::from_vec(vec![0.0, 1.0]),
            z: Array::from_vec(vec![0.0, 1.0]),
        });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind);
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        assert_eq!(record.refs.len(), 3);
        let directory = saver.into_directory();
        assert_eq!(directory.len(), 3);
        for name in &record.refs {
            assert!(directory.get(name).unwrap().is_array);
        }
    }

    #[test]
    fn shared_array_is_recorded_once() {
        let names = NameGenerator::new(1);
        let shared = Array::from_vec(vec![0.0, 1.0, 2.0]);
        let kind = Kind::Rectilinear(grids::Rectilinear { x: shared.clone(), y: shared.clone(), z: shared });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind);
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        let directory = saver.into_directory();
        assert_eq!(directory.len(), 1);
        assert_eq!(record.refs, vec![record.refs[0].clone(); 3]);
    }

    #[test]
    fn vec_field_recurses_into_grid_sub_object() {
        let names = NameGenerator::new(1);
        let grid_kind = Kind::Rectilinear(grids::Rectilinear {
            x: Array::from_vec(vec![0.0, 1.0]),
            y: Array::from_vec(vec![0.0, 1.0]),
            z: Array::from_vec(vec![0.0, 1.0]),
        });
        let grid = Object::construct(names.next_name(), Metadata::default(), grid_kind);
        let kind = Kind::Vec(VecField {
            components: smallvec::smallvec![Array::from_vec(vec![1.0, 2.0])],
            grid: grid.clone(),
            mapping: Mapping::Vertex,
        });
        let obj = Object::construct(names.next_name(), Metadata::default(), kind);
        let mut saver = DeepArchiveSaver::new(CompressionMode::None);
        let record = saver.save(&obj).unwrap();
        let directory = saver.into_directory();
        // one component array + the grid's three coordinate arrays
        assert_eq!(directory.iter().filter(|e| e.is_array).count(), 4);
        assert!(directory.iter().any(|e| !e.is_array && e.name == *grid.name()));
        assert_eq!(record.refs.last(), Some(grid.name()));
    }

    #[test]
    fn mapping_tag_round_trips() {
        for m in [Mapping::Vertex, Mapping::Element, Mapping::Unspecified] {
            assert_eq!(decode_mapping_tag(mapping_tag(m)), m);
        }
    }
}
