//! Fast LZ-family compression, modeled on LZ4 (§4.7).

use crate::codec::{Codec, SpeedHint};
use crate::error::CodecError;

pub struct Lz4;

impl Codec for Lz4 {
    fn compress(&self, input: &[u8], _speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError> {
        Ok(lz4_flex::compress(input))
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecError> {
        lz4_flex::decompress(input, uncompressed_size).map_err(|e| CodecError::DecompressionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = b"vistle vistle vistle vistle vistle vistle".repeat(4);
        let compressed = Lz4.compress(&data, SpeedHint::Fast).unwrap();
        let back = Lz4.decompress(&compressed, data.len()).unwrap();
        assert_eq!(back, data);
    }
}
