//! The chunk framing shared by every record in a `.vsld` file: a
//! `ChunkHeader` naming the chunk's type and byte size, the chunk's raw
//! payload, and a `ChunkFooter` repeating that size so a reader can also
//! walk the file backwards or verify it landed on the right boundary.

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::error::FileFormatError;

/// The on-disk format version this crate reads and writes. Bump only when
/// the chunk or header layouts change incompatibly.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_MAGIC: &[u8; 7] = b"Vistle\0";
const FOOTER_MAGIC: &[u8; 7] = b"vistle\0";

/// The kind of a chunk's payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChunkType {
    Invalid,
    /// A trailing index mapping every array/sub-object name written to
    /// this file to the byte offset of its `Archive` chunk.
    Directory,
    /// One port's published object for one timestep/block: a
    /// `PortObjectHeader` followed by its compressed inline record.
    PortObject,
    /// One directory entry's compressed payload (an array's bytes, or a
    /// sub-object's encoded record).
    Archive,
}

impl ChunkType {
    fn wire_tag(self) -> u8 {
        match self {
            ChunkType::Invalid => 0,
            ChunkType::Directory => 1,
            ChunkType::PortObject => 2,
            ChunkType::Archive => 3,
        }
    }

    fn from_wire_tag(tag: u8) -> ChunkType {
        match tag {
            1 => ChunkType::Directory,
            2 => ChunkType::PortObject,
            3 => ChunkType::Archive,
            _ => ChunkType::Invalid,
        }
    }
}

/// Precedes every chunk's payload.
#[derive(Clone, Copy, Debug)]
pub struct ChunkHeader {
    pub chunk_type: ChunkType,
    pub version: u32,
    pub size: u64,
}

impl ChunkHeader {
    pub fn new(chunk_type: ChunkType, size: u64) -> Self {
        ChunkHeader { chunk_type, version: FORMAT_VERSION, size }
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(HEADER_MAGIC)?;
        w.write_u8(self.chunk_type.wire_tag())?;
        w.write_u32::<LE>(self.version)?;
        w.write_u64::<LE>(self.size)?;
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> Result<Option<ChunkHeader>, FileFormatError> {
        let mut magic = [0u8; 7];
        match r.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        if &magic != HEADER_MAGIC {
            return Err(FileFormatError::Corrupt("chunk header magic mismatch".into()));
        }
        let chunk_type = ChunkType::from_wire_tag(r.read_u8()?);
        let version = r.read_u32::<LE>()?;
        if version != FORMAT_VERSION {
            return Err(FileFormatError::UnsupportedVersion(version));
        }
        let size = r.read_u64::<LE>()?;
        Ok(Some(ChunkHeader { chunk_type, version, size }))
    }
}

/// Follows every chunk's payload; lets a reader double-check it consumed
/// exactly `size` bytes and that the type it read back out matches.
#[derive(Clone, Copy, Debug)]
pub struct ChunkFooter {
    pub size: u64,
    pub chunk_type: ChunkType,
}

impl ChunkFooter {
    pub fn for_header(header: &ChunkHeader) -> Self {
        ChunkFooter { size: header.size, chunk_type: header.chunk_type }
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<LE>(self.size)?;
        w.write_u8(self.chunk_type.wire_tag())?;
        w.write_all(FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> Result<ChunkFooter, FileFormatError> {
        let size = r.read_u64::<LE>()?;
        let chunk_type = ChunkType::from_wire_tag(r.read_u8()?);
        let mut magic = [0u8; 7];
        r.read_exact(&mut magic)?;
        if &magic != FOOTER_MAGIC {
            return Err(FileFormatError::Corrupt("chunk footer magic mismatch".into()));
        }
        Ok(ChunkFooter { size, chunk_type })
    }

    /// Verifies this footer agrees with the header that opened its chunk.
    pub fn matches(&self, header: &ChunkHeader) -> bool {
        self.size == header.size && self.chunk_type == header.chunk_type
    }
}

/// Precedes a `PortObject` chunk's inline record: which port produced it,
/// and the timestep/block it belongs to.
#[derive(Clone, Debug)]
pub struct PortObjectHeader {
    pub version: u32,
    pub port: i32,
    pub timestep: i32,
    pub block: i32,
}

impl PortObjectHeader {
    pub fn new(port: i32, timestep: i32, block: i32) -> Self {
        PortObjectHeader { version: FORMAT_VERSION, port, timestep, block }
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u32::<LE>(self.version)?;
        w.write_i32::<LE>(self.port)?;
        w.write_i32::<LE>(self.timestep)?;
        w.write_i32::<LE>(self.block)?;
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> Result<PortObjectHeader, FileFormatError> {
        let version = r.read_u32::<LE>()?;
        if version != FORMAT_VERSION {
            return Err(FileFormatError::UnsupportedVersion(version));
        }
        let port = r.read_i32::<LE>()?;
        let timestep = r.read_i32::<LE>()?;
        let block = r.read_i32::<LE>()?;
        Ok(PortObjectHeader { version, port, timestep, block })
    }
}
