//! Writes one rank's chunked `.vsld` file: an `Archive` chunk per distinct
//! array/sub-object the first time it is referenced, then a `PortObject`
//! chunk per published object, and finally a trailing `Directory` chunk
//! indexing every `Archive` chunk's file offset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{WriteBytesExt, LE};

use vistle_archive::directory::encode_entry;
use vistle_archive::record::encode_record;
use vistle_archive::save::DeepArchiveSaver;
use vistle_codec::CompressionMode;
use vistle_core::{Name, Object};
use vistle_util::io::write_short_string;

use crate::chunk::{ChunkFooter, ChunkHeader, ChunkType, PortObjectHeader};
use crate::error::FileFormatError;

/// Builds the per-rank file name `<prefix>.<rank>.vsld` (§ cache module
/// convention: one file per MPI rank sharing a common prefix).
pub fn rank_file_path(prefix: &Path, rank: i32) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!(".{rank}.vsld"));
    PathBuf::from(name)
}

/// Writes published objects into one rank's chunked file, deduplicating
/// arrays and sub-objects shared across ports/timesteps within that file.
pub struct ChunkedFileWriter {
    file: BufWriter<File>,
    compression_mode: CompressionMode,
    saver: DeepArchiveSaver,
    flushed: HashMap<Name, u64>,
}

impl ChunkedFileWriter {
    /// Creates (or truncates) the file for `rank` under `prefix`.
    pub fn create(prefix: &Path, rank: i32, compression_mode: CompressionMode) -> Result<Self, FileFormatError> {
        let path = rank_file_path(prefix, rank);
        let file = File::create(&path)?;
        Ok(ChunkedFileWriter {
            file: BufWriter::new(file),
            compression_mode,
            saver: DeepArchiveSaver::new(compression_mode),
            flushed: HashMap::new(),
        })
    }

    /// Writes `object` as the current value on `port` for `timestep` and
    /// `block`. Any array or sub-object `object` references that has not
    /// yet been written to this file is flushed as an `Archive` chunk
    /// first.
    pub fn write_port_object(&mut self, port: i32, timestep: i32, block: i32, object: &Object) -> Result<(), FileFormatError> {
        let record = self.saver.save(object)?;
        self.flush_new_entries()?;

        let encoded = encode_record(&record);
        let mut payload = Vec::new();
        PortObjectHeader::new(port, timestep, block).write(&mut payload)?;
        write_short_string(&mut payload, &object.name().to_string())?;
        payload.write_u64::<LE>(encoded.len() as u64)?;
        payload.write_all(&encoded)?;

        let header = ChunkHeader::new(ChunkType::PortObject, payload.len() as u64);
        header.write(&mut self.file)?;
        self.file.write_all(&payload)?;
        ChunkFooter::for_header(&header).write(&mut self.file)?;
        Ok(())
    }

    fn flush_new_entries(&mut self) -> Result<(), FileFormatError> {
        let pending: Vec<_> = self
            .saver
            .directory()
            .iter()
            .filter(|e| !self.flushed.contains_key(&e.name))
            .cloned()
            .collect();
        for entry in pending {
            let offset = self.file.stream_position()?;
            let payload = encode_entry(&entry);
            let header = ChunkHeader::new(ChunkType::Archive, payload.len() as u64);
            header.write(&mut self.file)?;
            self.file.write_all(&payload)?;
            ChunkFooter::for_header(&header).write(&mut self.file)?;
            trace!("wrote Archive chunk for {} at offset {offset}", entry.name);
            self.flushed.insert(entry.name.clone(), offset);
        }
        Ok(())
    }

    /// Writes the trailing `Directory` chunk and flushes the file to disk.
    /// No further `write_port_object` calls are valid after this.
    pub fn finish(mut self) -> Result<(), FileFormatError> {
        let mut payload = Vec::new();
        payload.write_u32::<LE>(self.flushed.len() as u32)?;
        for (name, offset) in &self.flushed {
            write_short_string(&mut payload, &name.to_string())?;
            payload.write_u64::<LE>(*offset)?;
        }
        let header = ChunkHeader::new(ChunkType::Directory, payload.len() as u64);
        header.write(&mut self.file)?;
        self.file.write_all(&payload)?;
        ChunkFooter::for_header(&header).write(&mut self.file)?;
        self.file.flush()?;
        debug!("finished chunked file with {} archive entries", self.flushed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vistle_core::grids;
    use vistle_core::metadata::Metadata;
    use vistle_core::name::NameGenerator;
    use vistle_core::object::Kind;

    #[test]
    fn writes_archive_chunks_before_referencing_port_object() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("run");
        let mut writer = ChunkedFileWriter::create(&prefix, 0, CompressionMode::None).unwrap();

        let names = NameGenerator::new(1);
        let kind = Kind::Rectilinear(grids::Rectilinear {
            x: vistle_core::Array::from_vec(vec![0.0, 1.0]),
            y: vistle_core::Array::from_vec(vec![0.0, 1.0]),
            z: vistle_core::Array::from_vec(vec![0.0, 1.0]),
        });
        let obj = vistle_core::Object::construct(names.next_name(), Metadata::default(), kind);
        writer.write_port_object(0, 0, -1, &obj).unwrap();
        writer.finish().unwrap();

        let path = rank_file_path(&prefix, 0);
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
