//! The inline object record (§4.5): an object's type tag, metadata,
//! attributes, and the ordered names of everything it references — never
//! the referenced payloads themselves, which live as separate directory
//! entries.

use std::io::{self, Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use vistle_core::{Attributes, Metadata, Name, TypeTag};
use vistle_util::io::{read_short_string, write_short_string};

use crate::error::ArchiveError;

/// An object as it appears inline in a save/load stream: everything except
/// the referenced arrays/sub-objects, which are recorded by name only.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    pub tag: TypeTag,
    pub metadata: Metadata,
    pub attributes: Attributes,
    pub refs: Vec<Name>,
    /// The kind-specific scalar payload that doesn't fit the array/
    /// sub-object reference model: `Uniform`'s axes, `Structured`'s dims,
    /// `Indexed`'s has-radius flag, `Vec`'s mapping. Opaque here; encoded
    /// and decoded by `save`/`load` alongside `refs`.
    pub payload: Vec<u8>,
}

fn write_metadata(w: &mut impl Write, m: &Metadata) -> io::Result<()> {
    w.write_i32::<LE>(m.block)?;
    w.write_i32::<LE>(m.timestep)?;
    w.write_i32::<LE>(m.num_timesteps)?;
    w.write_i32::<LE>(m.num_blocks)?;
    w.write_i32::<LE>(m.execution_counter)?;
    w.write_i32::<LE>(m.iteration)?;
    w.write_i32::<LE>(m.creator)?;
    let cols: [[f32; 4]; 4] = m.transform.into();
    for col in &cols {
        for &v in col {
            w.write_f32::<LE>(v)?;
        }
    }
    w.write_f64::<LE>(m.real_time)?;
    Ok(())
}

fn read_metadata(r: &mut impl Read) -> io::Result<Metadata> {
    let block = r.read_i32::<LE>()?;
    let timestep = r.read_i32::<LE>()?;
    let num_timesteps = r.read_i32::<LE>()?;
    let num_blocks = r.read_i32::<LE>()?;
    let execution_counter = r.read_i32::<LE>()?;
    let iteration = r.read_i32::<LE>()?;
    let creator = r.read_i32::<LE>()?;
    let mut cols = [[0f32; 4]; 4];
    for col in &mut cols {
        for v in col.iter_mut() {
            *v = r.read_f32::<LE>()?;
        }
    }
    let real_time = r.read_f64::<LE>()?;
    Ok(Metadata {
        block,
        timestep,
        num_timesteps,
        num_blocks,
        execution_counter,
        iteration,
        creator,
        transform: cols.into(),
        real_time,
    })
}

/// Encodes `record` into the archive's inline binary form.
pub fn encode_record(record: &ObjectRecord) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u8(record.tag.wire_tag()).unwrap();
    write_metadata(&mut out, &record.metadata).unwrap();
    out.write_u32::<LE>(record.attributes.len() as u32).unwrap();
    for (k, v) in record.attributes.iter() {
        write_short_string(&mut out, k).unwrap();
        write_short_string(&mut out, v).unwrap();
    }
    out.write_u32::<LE>(record.refs.len() as u32).unwrap();
    for name in &record.refs {
        write_short_string(&mut out, &name.to_string()).unwrap();
    }
    out.write_u32::<LE>(record.payload.len() as u32).unwrap();
    out.write_all(&record.payload).unwrap();
    out
}

/// Decodes bytes produced by [`encode_record`].
pub fn decode_record(bytes: &[u8]) -> Result<ObjectRecord, ArchiveError> {
    let mut cur = Cursor::new(bytes);
    let wire_tag = cur.read_u8().map_err(io_err)?;
    let tag = TypeTag::from_wire_tag(wire_tag).ok_or_else(|| ArchiveError::Malformed(format!("unknown type tag byte {wire_tag}")))?;
    let metadata = read_metadata(&mut cur).map_err(io_err)?;
    let attr_count = cur.read_u32::<LE>().map_err(io_err)?;
    let mut attributes = Attributes::new();
    for _ in 0..attr_count {
        let k = read_short_string(&mut cur).map_err(io_err)?;
        let v = read_short_string(&mut cur).map_err(io_err)?;
        attributes.set(k, v);
    }
    let ref_count = cur.read_u32::<LE>().map_err(io_err)?;
    let mut refs = Vec::with_capacity(ref_count as usize);
    for _ in 0..ref_count {
        let s = read_short_string(&mut cur).map_err(io_err)?;
        let name: Name = s.parse().map_err(|_| ArchiveError::Malformed(format!("malformed name {s:?} in object record")))?;
        refs.push(name);
    }
    let payload_len = cur.read_u32::<LE>().map_err(io_err)? as usize;
    let mut payload = vec![0u8; payload_len];
    cur.read_exact(&mut payload).map_err(io_err)?;
    Ok(ObjectRecord { tag, metadata, attributes, refs, payload })
}

fn io_err(e: io::Error) -> ArchiveError {
    ArchiveError::Malformed(format!("truncated object record: {e}"))
}
