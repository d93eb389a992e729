use super::dct::{Block, BLOCK_AREA};
use crate::error::{PackError, PackResult};

pub const JPEG_LUMINANCE_QUANT: [u16; BLOCK_AREA] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104, 113,
    92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 99;

/// Quantized coefficients as stored in the byte stream. Each byte is a
/// two's-complement value in `[-128, 127]`.
pub type QuantizedBlock = [u8; BLOCK_AREA];

pub fn validate_quality(quality: u8) -> PackResult<u8> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(PackError::InvalidQuality(quality));
    }
    Ok(quality)
}

/// Per-image divisor matrix derived from the luminance base table.
///
/// The same matrix is applied to all three channels. It is immutable once
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationMatrix {
    quality: u8,
    table: [u16; BLOCK_AREA],
}

impl QuantizationMatrix {
    pub fn for_quality(quality: u8) -> PackResult<Self> {
        let quality = validate_quality(quality)? as u32;
        let multiplier = if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        };

        let mut table = [0u16; BLOCK_AREA];
        for (dst, &base) in table.iter_mut().zip(JPEG_LUMINANCE_QUANT.iter()) {
            let val = (multiplier * base as u32 + 50) / 100;
            *dst = val.max(1) as u16;
        }

        Ok(Self {
            quality: quality as u8,
            table,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn table(&self) -> &[u16; BLOCK_AREA] {
        &self.table
    }

    /// Truncating division by the matrix, narrowed to one byte.
    ///
    /// The narrowing wraps instead of saturating: a coefficient whose
    /// quotient leaves `[-128, 127]` aliases to another value.
    pub fn quantize(&self, freqs: &Block) -> QuantizedBlock {
        let mut output = [0u8; BLOCK_AREA];
        for i in 0..BLOCK_AREA {
            output[i] = (freqs[i] / self.table[i] as f64) as i32 as u8;
        }
        output
    }

    pub fn dequantize(&self, quantized: &QuantizedBlock) -> Block {
        let mut output = [0.0; BLOCK_AREA];
        for i in 0..BLOCK_AREA {
            output[i] = (quantized[i] as i8) as f64 * self.table[i] as f64;
        }
        output
    }
}
