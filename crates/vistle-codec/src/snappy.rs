//! Fast byte-stream compression, modeled on Snappy (§4.7).

use crate::codec::{Codec, SpeedHint};
use crate::error::CodecError;

pub struct Snappy;

impl Codec for Snappy {
    fn compress(&self, input: &[u8], _speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError> {
        let mut encoder = snap::raw::Encoder::new();
        encoder.compress_vec(input).map_err(|e| CodecError::CompressionFailed(e.to_string()))
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecError> {
        let mut decoder = snap::raw::Decoder::new();
        let out = decoder.decompress_vec(input).map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;
        if out.len() != uncompressed_size {
            return Err(CodecError::DecompressionFailed(format!(
                "uncompressed size mismatch: expected {}, found {}",
                uncompressed_size,
                out.len()
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = Snappy.compress(&data, SpeedHint::Fast).unwrap();
        let back = Snappy.decompress(&compressed, data.len()).unwrap();
        assert_eq!(back, data);
    }
}
