//! MSB-first bit packing for the entropy coder.

use crate::error::{PackError, PackResult};

/// Packs variable-length codes into bytes, most significant bit first.
///
/// `bits_written` counts meaningful bits independently of the buffer
/// length; the last byte is zero-padded by `finish`.
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    current: u8,
    filled: u8,
    bits_written: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Writes the low `len` bits of `bits`, highest of them first.
    pub fn write_bits(&mut self, bits: u64, len: u8) {
        debug_assert!(len <= 64);

        let mut remaining = len;
        while remaining > 0 {
            let free = 8 - self.filled;
            let take = remaining.min(free);
            let shift = remaining - take;
            let chunk = ((bits >> shift) & ((1u64 << take) - 1)) as u8;

            self.current |= chunk << (free - take);
            self.filled += take;
            remaining -= take;

            if self.filled == 8 {
                self.buffer.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
        self.bits_written += len as u64;
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flushes the partial byte with zero padding and returns the buffer
    /// together with the count of meaningful bits.
    pub fn finish(mut self) -> (Vec<u8>, u64) {
        if self.filled > 0 {
            self.buffer.push(self.current);
        }
        (self.buffer, self.bits_written)
    }
}

/// Reads back a buffer produced by [`BitWriter`], stopping at the declared
/// bit count rather than at the end of the buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: u64,
    limit: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], bit_count: u64) -> PackResult<Self> {
        let available = data.len() as u64 * 8;
        if bit_count > available {
            return Err(PackError::Truncated {
                declared_bits: bit_count,
                available_bits: available,
            });
        }
        Ok(Self {
            data,
            position: 0,
            limit: bit_count,
        })
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.limit
    }

    pub fn read_bit(&mut self) -> PackResult<bool> {
        if self.is_exhausted() {
            return Err(PackError::DecodingError(format!(
                "read past the last meaningful bit ({})",
                self.limit
            )));
        }
        let byte = self.data[(self.position / 8) as usize];
        let bit = (byte >> (7 - (self.position % 8))) & 1;
        self.position += 1;
        Ok(bit == 1)
    }

    /// Reads exactly `count` bits (at most 64) into the low end of a `u64`.
    pub fn read_bits(&mut self, count: u8) -> PackResult<u64> {
        if count > 64 {
            return Err(PackError::DecodingError(format!(
                "cannot read {} bits at once",
                count
            )));
        }
        if (count as u64) > self.remaining() {
            return Err(PackError::DecodingError(format!(
                "requested {} bits, {} left",
                count,
                self.remaining()
            )));
        }
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }
}
