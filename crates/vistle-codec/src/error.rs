//! Codec errors (§4.7, §10.2).

use std::fmt;

/// Failure modes of a codec's `compress`/`decompress` call.
#[derive(Clone, Debug, PartialEq)]
pub enum CodecError {
    /// The underlying compressor rejected the input or ran out of output
    /// space.
    CompressionFailed(String),
    /// The underlying decompressor could not reconstruct the payload, e.g.
    /// a corrupt stream or a size mismatch against the recorded
    /// uncompressed size.
    DecompressionFailed(String),
    /// A `ZFP`-like sub-mode parameter was out of its valid range.
    InvalidParameter(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::CompressionFailed(msg) => write!(f, "compression failed: {msg}"),
            CodecError::DecompressionFailed(msg) => write!(f, "decompression failed: {msg}"),
            CodecError::InvalidParameter(msg) => write!(f, "invalid codec parameter: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}
