//! Reads one rank's chunked `.vsld` file back into published objects,
//! honoring a timestep [`Restraint`], an optional reorder-by-timestep
//! pass, and renumbering timesteps to a consecutive sequence.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{ReadBytesExt, LE};

use vistle_archive::directory::decode_entry;
use vistle_archive::load::{DeepArchiveLoader, Renaming};
use vistle_archive::record::decode_record;
use vistle_core::{Name, Object};
use vistle_util::io::read_short_string;
use vistle_util::Restraint;

use crate::chunk::{ChunkFooter, ChunkHeader, ChunkType, PortObjectHeader};
use crate::error::FileFormatError;
use crate::writer::rank_file_path;

/// One object read back from a file, alongside the port/timestep/block it
/// was published on.
#[derive(Clone, Debug)]
pub struct PortObjectRecord {
    pub port: i32,
    pub timestep: i32,
    pub block: i32,
    pub object: Object,
}

/// Read options mirroring the cache module's UI: which timesteps to keep,
/// whether to deliver them sorted by timestep rather than file order, and
/// whether to renumber the surviving timesteps consecutively from zero.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub timesteps: Restraint,
    pub reorder: bool,
    pub renumber: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions { timesteps: Restraint::all(), reorder: false, renumber: false }
    }
}

/// Reads every `PortObject` chunk from `<prefix>.<rank>.vsld` that survives
/// `options.timesteps`, applying reorder/renumber as requested.
pub fn read_rank(prefix: &Path, rank: i32, options: &ReadOptions) -> Result<Vec<PortObjectRecord>, FileFormatError> {
    let path = rank_file_path(prefix, rank);
    let mut file = BufReader::new(File::open(&path)?);

    let mut loader = DeepArchiveLoader::new(vistle_archive::Directory::new(), Renaming::Keep);

    let mut pending: Vec<(PortObjectHeader, Name, Vec<u8>)> = Vec::new();

    loop {
        let header = match ChunkHeader::read(&mut file)? {
            Some(h) => h,
            None => break,
        };
        let mut payload = vec![0u8; header.size as usize];
        file.read_exact(&mut payload)?;
        let footer = ChunkFooter::read(&mut file)?;
        if !footer.matches(&header) {
            return Err(FileFormatError::Corrupt("chunk footer does not match its header".into()));
        }

        match header.chunk_type {
            ChunkType::Archive => {
                let entry = decode_entry(&payload)?;
                loader.insert_entry(entry);
            }
            ChunkType::PortObject => {
                let mut cur = std::io::Cursor::new(payload);
                let poh = PortObjectHeader::read(&mut cur)?;
                let object_name: Name = read_short_string(&mut cur)?
                    .parse()
                    .map_err(|_| FileFormatError::Corrupt("malformed object name in PortObject chunk".into()))?;
                let record_len = cur.read_u64::<LE>()? as usize;
                let mut record_bytes = vec![0u8; record_len];
                cur.read_exact(&mut record_bytes)?;
                if options.timesteps.contains(poh.timestep as i64) {
                    pending.push((poh, object_name, record_bytes));
                }
            }
            ChunkType::Directory => {
                // A trailing index of Archive chunk offsets; this reader
                // processes chunks sequentially and never needs to seek,
                // so the index is read and discarded.
            }
            ChunkType::Invalid => return Err(FileFormatError::Corrupt("chunk with Invalid type".into())),
        }
    }

    debug!("read {} port-object chunks surviving the timestep restraint", pending.len());
    if options.reorder {
        pending.sort_by_key(|(poh, _, _)| poh.timestep);
    }

    let mut renumbered: HashMap<i32, i32> = HashMap::new();
    let mut already_renumbered: HashSet<Name> = HashSet::new();
    let mut next_index = 0i32;
    let num_timesteps: i32 = if options.renumber {
        pending.iter().map(|(poh, _, _)| poh.timestep).collect::<HashSet<_>>().len() as i32
    } else {
        0
    };

    let mut out = Vec::with_capacity(pending.len());
    for (poh, object_name, record_bytes) in pending {
        let mut record = decode_record(&record_bytes)?;
        let mut timestep = poh.timestep;
        if options.renumber && !already_renumbered.contains(&object_name) {
            timestep = *renumbered.entry(poh.timestep).or_insert_with(|| {
                let idx = next_index;
                next_index += 1;
                idx
            });
            record.metadata.timestep = timestep;
            record.metadata.num_timesteps = num_timesteps;
            already_renumbered.insert(object_name.clone());
        } else if options.renumber {
            timestep = record.metadata.timestep;
        }
        let object = loader.load_record(&object_name, &record)?;
        out.push(PortObjectRecord { port: poh.port, timestep, block: poh.block, object });
    }
    Ok(out)
}
