//! Lossy float quantization, modeled on ZFP (§4.7). Pure-Rust: rather than
//! bind the real ZFP C library, this implements the three sub-modes
//! (`FixedAccuracy`, `FixedPrecision`, `FixedRate`) as linear quantization
//! to a computed bit width, packed tightly.
//!
//! Header layout (little-endian): `element_size: u8, bits: u8, count: u32,
//! min: f64, max: f64`, followed by `count` values each packed into `bits`
//! bits, MSB-first across the byte stream.

use crate::codec::{Codec, SpeedHint};
use crate::error::CodecError;
use crate::mode::ZfpMode;

pub struct Zfp {
    pub sub_mode: ZfpMode,
    pub element_size: usize,
}

const HEADER_LEN: usize = 1 + 1 + 4 + 8 + 8;

fn read_floats(input: &[u8], element_size: usize) -> Result<Vec<f64>, CodecError> {
    match element_size {
        4 => {
            if input.len() % 4 != 0 {
                return Err(CodecError::CompressionFailed("input not a multiple of 4 bytes".into()));
            }
            Ok(input.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64).collect())
        }
        8 => {
            if input.len() % 8 != 0 {
                return Err(CodecError::CompressionFailed("input not a multiple of 8 bytes".into()));
            }
            Ok(input
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect())
        }
        other => Err(CodecError::InvalidParameter(format!("unsupported float element size {other}"))),
    }
}

fn write_floats(values: &[f64], element_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * element_size);
    for &v in values {
        match element_size {
            4 => out.extend_from_slice(&(v as f32).to_le_bytes()),
            8 => out.extend_from_slice(&v.to_le_bytes()),
            _ => unreachable!("validated by read_floats"),
        }
    }
    out
}

fn bits_for(sub_mode: ZfpMode, min: f64, max: f64) -> Result<u32, CodecError> {
    let range = (max - min).max(0.0);
    let bits = match sub_mode {
        ZfpMode::FixedPrecision(bits) => bits,
        ZfpMode::FixedRate(bits) => bits,
        ZfpMode::FixedAccuracy(tolerance) => {
            if tolerance <= 0.0 {
                return Err(CodecError::InvalidParameter("FixedAccuracy tolerance must be positive".into()));
            }
            if range == 0.0 {
                1
            } else {
                ((range / tolerance).log2().ceil() as i64 + 1).clamp(1, 63) as u32
            }
        }
    };
    if bits == 0 || bits > 63 {
        return Err(CodecError::InvalidParameter(format!("bit width {bits} out of range")));
    }
    Ok(bits)
}

struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    filled: u8,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { bytes: Vec::new(), cur: 0, filled: 0 }
    }

    fn push(&mut self, value: u64, bits: u32) {
        for i in (0..bits).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.cur = (self.cur << 1) | bit;
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.cur);
                self.cur = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.cur <<= 8 - self.filled;
            self.bytes.push(self.cur);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, byte_pos: 0, bit_pos: 0 }
    }

    fn pull(&mut self, bits: u32) -> Result<u64, CodecError> {
        let mut value = 0u64;
        for _ in 0..bits {
            let byte = self.bytes.get(self.byte_pos).ok_or_else(|| CodecError::DecompressionFailed("bit stream truncated".into()))?;
            let bit = (byte >> (7 - self.bit_pos)) & 1;
            value = (value << 1) | bit as u64;
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
        }
        Ok(value)
    }
}

impl Codec for Zfp {
    fn compress(&self, input: &[u8], _speed_hint: SpeedHint) -> Result<Vec<u8>, CodecError> {
        let values = read_floats(input, self.element_size)?;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = if values.is_empty() { (0.0, 0.0) } else { (min, max) };
        let bits = bits_for(self.sub_mode, min, max)?;
        let levels = ((1u64 << bits) - 1) as f64;
        let range = (max - min).max(f64::EPSILON);

        let mut out = Vec::with_capacity(HEADER_LEN + values.len());
        out.push(self.element_size as u8);
        out.push(bits as u8);
        out.extend_from_slice(&(values.len() as u32).to_le_bytes());
        out.extend_from_slice(&min.to_le_bytes());
        out.extend_from_slice(&max.to_le_bytes());

        let mut writer = BitWriter::new();
        for &v in &values {
            let t = ((v - min) / range).clamp(0.0, 1.0);
            let quantized = (t * levels).round() as u64;
            writer.push(quantized, bits);
        }
        out.extend_from_slice(&writer.finish());
        Ok(out)
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecError> {
        if input.len() < HEADER_LEN {
            return Err(CodecError::DecompressionFailed("truncated ZFP header".into()));
        }
        let element_size = input[0] as usize;
        let bits = input[1] as u32;
        let count = u32::from_le_bytes([input[2], input[3], input[4], input[5]]) as usize;
        let min = f64::from_le_bytes(input[6..14].try_into().unwrap());
        let max = f64::from_le_bytes(input[14..22].try_into().unwrap());
        let levels = ((1u64 << bits) - 1) as f64;
        let range = (max - min).max(f64::EPSILON);

        let mut reader = BitReader::new(&input[HEADER_LEN..]);
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let quantized = reader.pull(bits)?;
            let t = quantized as f64 / levels;
            values.push(min + t * range);
        }
        let out = write_floats(&values, element_size);
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
    fn fixed_rate_round_trips_within_quantization_error() {
        let values: Vec<f32> = (0..64).map(|i| i as f32 * 0.1).collect();
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let codec = Zfp { sub_mode: ZfpMode::FixedRate(16), element_size: 4 };
        let compressed = codec.compress(&bytes, SpeedHint::Balanced).unwrap();
        let back = codec.decompress(&compressed, bytes.len()).unwrap();
        let recovered: Vec<f32> = back.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
        for (a, b) in values.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 0.01, "{a} vs {b}");
        }
    }

    #[test]
    fn fixed_accuracy_honors_tolerance() {
        let values: Vec<f64> = (0..32).map(|i| (i as f64 - 16.0) * 0.5).collect();
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let tol = 1e-3;
        let codec = Zfp { sub_mode: ZfpMode::FixedAccuracy(tol), element_size: 8 };
        let compressed = codec.compress(&bytes, SpeedHint::Balanced).unwrap();
        let back = codec.decompress(&compressed, bytes.len()).unwrap();
        let recovered: Vec<f64> = back.chunks_exact(8).map(|c| f64::from_le_bytes(c.try_into().unwrap())).collect();
        for (a, b) in values.iter().zip(recovered.iter()) {
            assert!((a - b).abs() <= tol, "{a} vs {b}");
        }
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let codec = Zfp { sub_mode: ZfpMode::FixedAccuracy(0.0), element_size: 4 };
        assert!(codec.compress(&[0u8; 4], SpeedHint::Fast).is_err());
    }
}
