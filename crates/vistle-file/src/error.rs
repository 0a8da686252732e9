//! Chunked file format errors.

use std::fmt;
use std::io;

/// Failure modes of the chunked file reader/writer.
#[derive(Debug)]
pub enum FileFormatError {
    /// A chunk header's magic bytes didn't match, or its footer didn't
    /// agree with the header that opened it.
    Corrupt(String),
    /// The chunk header declared a format version this reader doesn't
    /// know how to read.
    UnsupportedVersion(u32),
    /// The underlying file I/O failed.
    Io(io::Error),
    /// A chunk's payload failed to decompress or deserialize.
    Archive(vistle_archive::ArchiveError),
}

impl fmt::Display for FileFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormatError::Corrupt(msg) => write!(f, "corrupt vistle file: {msg}"),
            FileFormatError::UnsupportedVersion(v) => write!(f, "unsupported chunk format version {v}"),
            FileFormatError::Io(e) => write!(f, "I/O error: {e}"),
            FileFormatError::Archive(e) => write!(f, "archive error: {e}"),
        }
    }
}

impl std::error::Error for FileFormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileFormatError::Io(e) => Some(e),
            FileFormatError::Archive(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FileFormatError {
    fn from(e: io::Error) -> Self {
        FileFormatError::Io(e)
    }
}

impl From<vistle_archive::ArchiveError> for FileFormatError {
    fn from(e: vistle_archive::ArchiveError) -> Self {
        FileFormatError::Archive(e)
    }
}
