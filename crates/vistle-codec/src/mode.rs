//! Compression mode selection (§4.7).

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

/// The ZFP-like lossy float sub-mode and its parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZfpMode {
    /// Every reconstructed value is within `tolerance` of the original.
    FixedAccuracy(f64),
    /// Each value is quantized to `bits` bits of mantissa precision.
    FixedPrecision(u32),
    /// Each value is encoded using exactly `bits_per_value` bits.
    FixedRate(u32),
}

/// A payload compression mode (§4.7). Recorded per archive directory entry
/// alongside the compressed/uncompressed sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompressionMode {
    None,
    /// Fast byte-stream compression (modeled on Snappy).
    Snappy,
    /// Range-coded, higher-ratio compression (modeled on Zstandard).
    Zstd { level: i32 },
    /// Fast LZ-family compression (modeled on LZ4).
    Lz4,
    /// Lossy float quantization (modeled on ZFP).
    Zfp(ZfpMode),
}

impl CompressionMode {
    /// Short stable tag used on disk (§4.6 archive entries record
    /// `compression_mode`); values must never change meaning once
    /// assigned.
    pub fn wire_tag(self) -> u8 {
        match self {
            CompressionMode::None => 0,
            CompressionMode::Snappy => 1,
            CompressionMode::Zstd { .. } => 2,
            CompressionMode::Lz4 => 3,
            CompressionMode::Zfp(ZfpMode::FixedAccuracy(_)) => 4,
            CompressionMode::Zfp(ZfpMode::FixedPrecision(_)) => 5,
            CompressionMode::Zfp(ZfpMode::FixedRate(_)) => 6,
        }
    }

    /// Writes the tag plus whatever parameter the mode carries, for
    /// recording a directory entry's compression mode on disk.
    pub fn encode(self, w: &mut impl Write) -> io::Result<()> {
        w.write_u8(self.wire_tag())?;
        match self {
            CompressionMode::None | CompressionMode::Snappy | CompressionMode::Lz4 => {}
            CompressionMode::Zstd { level } => w.write_i32::<LE>(level)?,
            CompressionMode::Zfp(ZfpMode::FixedAccuracy(tol)) => w.write_f64::<LE>(tol)?,
            CompressionMode::Zfp(ZfpMode::FixedPrecision(bits)) => w.write_u32::<LE>(bits)?,
            CompressionMode::Zfp(ZfpMode::FixedRate(bits)) => w.write_u32::<LE>(bits)?,
        }
        Ok(())
    }

    /// The inverse of [`CompressionMode::encode`].
    pub fn decode(r: &mut impl Read) -> io::Result<Option<CompressionMode>> {
        let tag = r.read_u8()?;
        Ok(Some(match tag {
            0 => CompressionMode::None,
            1 => CompressionMode::Snappy,
            2 => CompressionMode::Zstd { level: r.read_i32::<LE>()? },
            3 => CompressionMode::Lz4,
            4 => CompressionMode::Zfp(ZfpMode::FixedAccuracy(r.read_f64::<LE>()?)),
            5 => CompressionMode::Zfp(ZfpMode::FixedPrecision(r.read_u32::<LE>()?)),
            6 => CompressionMode::Zfp(ZfpMode::FixedRate(r.read_u32::<LE>()?)),
            _ => return Ok(None),
        }))
    }
}
