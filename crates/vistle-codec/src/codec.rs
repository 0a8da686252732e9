//! The codec trait and the dispatcher that picks an implementation per
//! [`CompressionMode`] (§4.7).

use crate::error::CodecError;
use crate::mode::CompressionMode;

/// A speed/ratio hint passed to `compress`, mirroring `archiveCompressionSpeed()`
/// from the original implementation's `ArchiveCompressionSettings` (carried
/// over per §10's supplement).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedHint {
    Fast,
    Balanced,
    BestRatio,
}

/// One compression backend. Each implementation is opaque: a caller never
/// needs to know which crate backs a given mode, only that `compress` and
/// `decompress` round-trip.
pub trait Codec {
    fn compress(&self, input: &[u8], speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError>;
    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecError>;
}

/// Compresses `input` under `mode`. For `Zfp` modes, `element_size` must be
/// `4` (f32) or `8` (f64); any other mode ignores it.
pub fn compress(mode: CompressionMode, input: &[u8], element_size: usize, speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError> {
    match mode {
        CompressionMode::None => Ok(input.to_vec()),
        CompressionMode::Snappy => crate::snappy::Snappy.compress(input, speed_hint),
        CompressionMode::Zstd { level } => crate::zstd_codec::Zstd { level }.compress(input, speed_hint),
        CompressionMode::Lz4 => crate::lz4::Lz4.compress(input, speed_hint),
        #[cfg(feature = "zfp")]
        CompressionMode::Zfp(sub) => crate::zfp::Zfp { sub_mode: sub, element_size }.compress(input, speed_hint),
        #[cfg(not(feature = "zfp"))]
        CompressionMode::Zfp(_) => {
            warn!("zfp compression requested but the \"zfp\" feature is not enabled");
            Err(CodecError::CompressionFailed("zfp support not compiled in; enable the \"zfp\" feature".into()))
        }
    }
}

/// Decompresses `input` under `mode`, expecting `uncompressed_size` output
/// bytes.
pub fn decompress(mode: CompressionMode, input: &[u8], uncompressed_size: usize, element_size: usize) -> Result<Vec<u8>, CodecError> {
    match mode {
        CompressionMode::None => {
            if input.len() != uncompressed_size {
                return Err(CodecError::DecompressionFailed(format!(
                    "uncompressed size mismatch: expected {}, found {}",
                    uncompressed_size,
                    input.len()
                )));
            }
            Ok(input.to_vec())
        }
        CompressionMode::Snappy => crate::snappy::Snappy.decompress(input, uncompressed_size),
        CompressionMode::Zstd { level } => crate::zstd_codec::Zstd { level }.decompress(input, uncompressed_size),
        CompressionMode::Lz4 => crate::lz4::Lz4.decompress(input, uncompressed_size),
        #[cfg(feature = "zfp")]
        CompressionMode::Zfp(sub) => crate::zfp::Zfp { sub_mode: sub, element_size }.decompress(input, uncompressed_size),
        #[cfg(not(feature = "zfp"))]
        CompressionMode::Zfp(_) => Err(CodecError::DecompressionFailed("zfp support not compiled in; enable the \"zfp\" feature".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_mode_is_identity() {
        let data = b"hello vistle".to_vec();
        let compressed = compress(CompressionMode::None, &data, 1, SpeedHint::Fast).unwrap();
        assert_eq!(compressed, data);
        let back = decompress(CompressionMode::None, &compressed, data.len(), 1).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn none_mode_rejects_size_mismatch() {
        let data = b"abc".to_vec();
        assert!(decompress(CompressionMode::None, &data, 10, 1).is_err());
    }
}
