//! Archive errors (§4.5, §10.2).

use std::fmt;

use vistle_core::Name;

/// Failure modes of save/load.
#[derive(Clone, Debug)]
pub enum ArchiveError {
    /// The root object record referenced a name with no directory entry.
    MissingEntry(Name),
    /// A directory entry's compressed payload failed to decompress.
    Codec(vistle_codec::CodecError),
    /// A referenced array decompressed to a byte count not divisible by
    /// its element size, or some other structural inconsistency in the
    /// saved graph.
    Malformed(String),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::MissingEntry(name) => write!(f, "archive directory has no entry for {name}"),
            ArchiveError::Codec(e) => write!(f, "codec error while materializing archive entry: {e}"),
            ArchiveError::Malformed(msg) => write!(f, "malformed archive: {msg}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<vistle_codec::CodecError> for ArchiveError {
    fn from(e: vistle_codec::CodecError) -> Self {
        ArchiveError::Codec(e)
    }
}
