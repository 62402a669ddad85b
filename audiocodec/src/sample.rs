//! Conversion between little-endian integer samples and normalized `f32`.
//!
//! Scaling is asymmetric: negative values are divided by `2^(n-1)` and
//! non-negative values by `2^(n-1) - 1`, so both `MIN` and `MAX` map exactly
//! onto `-1.0` and `1.0`.

const I16_NEG: f32 = 32_768.0;
const I16_POS: f32 = 32_767.0;
const I32_NEG: f64 = 2_147_483_648.0;
const I32_POS: f64 = 2_147_483_647.0;

/// Decodes a 16-bit little-endian sample.
///
/// # Panics
///
/// Panics if `sample` is shorter than 2 bytes.
#[inline]
pub fn decode_i16(sample: &[u8]) -> f32 {
    let v = i16::from_le_bytes([sample[0], sample[1]]);
    if v < 0 {
        v as f32 / I16_NEG
    } else {
        v as f32 / I16_POS
    }
}

/// Encodes a normalized sample as 16-bit little-endian into `buf[..2]`.
/// Values outside `[-1.0, 1.0]` are clamped.
#[inline]
pub fn encode_i16(sample: f32, buf: &mut [u8]) {
    let v = if sample < 0.0 {
        (sample * I16_NEG).round().max(i16::MIN as f32)
    } else {
        (sample * I16_POS).round().min(i16::MAX as f32)
    };
    buf[..2].copy_from_slice(&(v as i16).to_le_bytes());
}

/// Decodes a 32-bit little-endian sample.
///
/// # Panics
///
/// Panics if `sample` is shorter than 4 bytes.
#[inline]
pub fn decode_i32(sample: &[u8]) -> f32 {
    let v = i32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
    if v < 0 {
        (v as f64 / I32_NEG) as f32
    } else {
        (v as f64 / I32_POS) as f32
    }
}

/// Encodes a normalized sample as 32-bit little-endian into `buf[..4]`.
/// Values outside `[-1.0, 1.0]` are clamped.
#[inline]
pub fn encode_i32(sample: f32, buf: &mut [u8]) {
    let sample = sample as f64;
    let v = if sample < 0.0 {
        (sample * I32_NEG).round().max(i32::MIN as f64)
    } else {
        (sample * I32_POS).round().min(i32::MAX as f64)
    };
    buf[..4].copy_from_slice(&(v as i32).to_le_bytes());
}

/// Integer sample layouts the resampler can decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    I16,
    I32,
}

impl SampleFormat {
    /// Returns the layout for a linear PCM bit depth, if supported.
    pub const fn from_bit_rate(bit_rate: u32) -> Option<Self> {
        match bit_rate {
            16 => Some(SampleFormat::I16),
            32 => Some(SampleFormat::I32),
            _ => None,
        }
    }

    /// Bytes per sample.
    pub const fn size(&self) -> usize {
        match self {
            SampleFormat::I16 => 2,
            SampleFormat::I32 => 4,
        }
    }

    /// Decodes every whole sample in `bytes` and appends it to `out`.
    /// Trailing partial bytes are ignored.
    pub fn decode_into(&self, bytes: &[u8], out: &mut Vec<f32>) {
        let chunks = bytes.chunks_exact(self.size());
        out.reserve(chunks.len());
        match self {
            SampleFormat::I16 => out.extend(chunks.map(decode_i16)),
            SampleFormat::I32 => out.extend(chunks.map(decode_i32)),
        }
    }

    /// Encodes `samples` and appends the bytes to `out`.
    pub fn encode_into(&self, samples: &[f32], out: &mut Vec<u8>) {
        let size = self.size();
        let start = out.len();
        out.resize(start + samples.len() * size, 0);
        let dst = out[start..].chunks_exact_mut(size);
        match self {
            SampleFormat::I16 => {
                for (s, buf) in samples.iter().zip(dst) {
                    encode_i16(*s, buf);
                }
            }
            SampleFormat::I32 => {
                for (s, buf) in samples.iter().zip(dst) {
                    encode_i32(*s, buf);
                }
            }
        }
    }
}
