//! The archive directory (§4.5): one entry per distinct array or sub-object
//! referenced anywhere in the saved graph.

use std::collections::HashMap;
use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use vistle_core::{ElementType, Name};
use vistle_codec::CompressionMode;
use vistle_util::io::{read_short_bytes, read_short_string, write_short_bytes, write_short_string};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// One directory entry: a name's compressed payload and the bookkeeping
/// needed to decompress it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DirectoryEntry {
    pub name: Name,
    pub is_array: bool,
    /// The array's element type, so the loader can reinterpret the
    /// decompressed bytes as the right `Array<T>`. `None` for sub-object
    /// entries, which the loader reconstructs from their own record.
    pub element_type: Option<ElementType>,
    pub uncompressed_size: usize,
    #[cfg_attr(feature = "serialize", serde(skip, default = "default_mode"))]
    pub compression_mode: CompressionMode,
    pub compressed_bytes: Vec<u8>,
}

#[cfg(feature = "serialize")]
fn default_mode() -> CompressionMode {
    CompressionMode::None
}

fn encode_element_type(et: Option<ElementType>) -> u8 {
    match et {
        None => 0,
        Some(ElementType::Byte) => 1,
        Some(ElementType::Int32) => 2,
        Some(ElementType::Int64) => 3,
        Some(ElementType::Float32) => 4,
        Some(ElementType::Float64) => 5,
    }
}

fn decode_element_type(tag: u8) -> Result<Option<ElementType>, ArchiveError> {
    Ok(match tag {
        0 => None,
        1 => Some(ElementType::Byte),
        2 => Some(ElementType::Int32),
        3 => Some(ElementType::Int64),
        4 => Some(ElementType::Float32),
        5 => Some(ElementType::Float64),
        other => return Err(ArchiveError::Malformed(format!("unknown element type byte {other}"))),
    })
}

/// Encodes one directory entry for storage as a chunked file's `Archive`
/// chunk payload.
pub fn encode_entry(entry: &DirectoryEntry) -> Vec<u8> {
    let mut out = Vec::new();
    write_short_string(&mut out, &entry.name.to_string()).unwrap();
    out.write_u8(entry.is_array as u8).unwrap();
    out.write_u8(encode_element_type(entry.element_type)).unwrap();
    out.write_u64::<LE>(entry.uncompressed_size as u64).unwrap();
    entry.compression_mode.encode(&mut out).unwrap();
    write_short_bytes(&mut out, &entry.compressed_bytes).unwrap();
    out
}

/// The inverse of [`encode_entry`].
pub fn decode_entry(bytes: &[u8]) -> Result<DirectoryEntry, ArchiveError> {
    let mut cur = io::Cursor::new(bytes);
    let name: Name = read_short_string(&mut cur)
        .map_err(io_err)?
        .parse()
        .map_err(|_| ArchiveError::Malformed("malformed name in directory entry".into()))?;
    let is_array = cur.read_u8().map_err(io_err)? != 0;
    let element_type = decode_element_type(cur.read_u8().map_err(io_err)?)?;
    let uncompressed_size = cur.read_u64::<LE>().map_err(io_err)? as usize;
    let compression_mode = CompressionMode::decode(&mut cur)
        .map_err(io_err)?
        .ok_or_else(|| ArchiveError::Malformed("unknown compression mode byte".into()))?;
    let compressed_bytes = read_short_bytes(&mut cur).map_err(io_err)?;
    Ok(DirectoryEntry { name, is_array, element_type, uncompressed_size, compression_mode, compressed_bytes })
}

fn io_err(e: io::Error) -> ArchiveError {
    ArchiveError::Malformed(format!("truncated directory entry: {e}"))
}

/// A save/load directory: every distinct name recorded exactly once
/// (§4.5, "writing each unique name exactly once").
#[derive(Clone, Debug, Default)]
pub struct Directory {
    entries: HashMap<Name, DirectoryEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Directory::default()
    }

    /// Whether `name` already has an entry recorded.
    pub fn contains(&self, name: &Name) -> bool {
        self.entries.contains_key(name)
    }

    /// Records a new entry. Overwrites silently if `name` was already
    /// present — callers are expected to check [`Directory::contains`]
    /// first to avoid redundant compression work.
    pub fn insert(&mut self, entry: DirectoryEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &Name) -> Option<&DirectoryEntry> {
        self.entries.get(name)
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_core::NameGenerator;

    #[test]
    fn insert_and_get_round_trip() {
        let names = NameGenerator::new(1);
        let mut dir = Directory::new();
        let name = names.next_name();
        assert!(!dir.contains(&name));
        dir.insert(DirectoryEntry {
            name: name.clone(),
            is_array: true,
            element_type: Some(vistle_core::ElementType::Float64),
            uncompressed_size: 16,
            compression_mode: CompressionMode::None,
            compressed_bytes: vec![0; 16],
        });
        assert!(dir.contains(&name));
        assert_eq!(dir.get(&name).unwrap().uncompressed_size, 16);
    }

    #[test]
    fn entry_round_trips_through_encode_decode() {
        let names = NameGenerator::new(2);
        let entry = DirectoryEntry {
            name: names.next_name(),
            is_array: true,
            element_type: Some(vistle_core::ElementType::Int64),
            uncompressed_size: 240,
            compression_mode: CompressionMode::Zstd { level: 5 },
            compressed_bytes: vec![9, 8, 7, 6, 5],
        };
        let bytes = encode_entry(&entry);
        let back = decode_entry(&bytes).unwrap();
        assert_eq!(back.name, entry.name);
        assert_eq!(back.is_array, entry.is_array);
        assert_eq!(back.element_type, entry.element_type);
        assert_eq!(back.uncompressed_size, entry.uncompressed_size);
        assert_eq!(back.compression_mode, entry.compression_mode);
        assert_eq!(back.compressed_bytes, entry.compressed_bytes);
    }

    #[test]
    fn sub_object_entry_round_trips_with_no_element_type() {
        let names = NameGenerator::new(3);
        let entry = DirectoryEntry {
            name: names.next_name(),
            is_array: false,
            element_type: None,
            uncompressed_size: 12,
            compression_mode: CompressionMode::None,
            compressed_bytes: vec![1, 2, 3],
        };
        let back = decode_entry(&encode_entry(&entry)).unwrap();
        assert_eq!(back.element_type, None);
        assert!(!back.is_array);
    }
}
