//! Range-coded compression, modeled on Zstandard (§4.7). Chosen as the
//! default mode for integer/byte arrays.

use crate::codec::{Codec, SpeedHint};
use crate::error::CodecError;

pub struct Zstd {
    pub level: i32,
}

impl Codec for Zstd {
    fn compress(&self, input: &[u8], speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError> {
        let level = match speed_hint {
            SpeedHint::Fast => self.level.min(1),
            SpeedHint::Balanced => self.level,
            SpeedHint::BestRatio => self.level.max(19),
        };
        zstd::bulk::compress(input, level).map_err(|e| CodecError::CompressionFailed(e.to_string()))
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecError> {
        zstd::bulk::decompress(input, uncompressed_size).map_err(|e| CodecError::DecompressionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let codec = Zstd { level: 3 };
        let compressed = codec.compress(&data, SpeedHint::Balanced).unwrap();
        let back = codec.decompress(&compressed, data.len()).unwrap();
        assert_eq!(back, data);
    }
}
