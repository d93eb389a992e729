use crate::compression::dct::BLOCK_SIZE;
use crate::compression::quantizer::validate_quality;
use crate::error::{PackError, PackResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

pub const MAGIC: &[u8; 8] = b"DCTPACK\x01";

/// Encoded size of [`RecordHeader`].
pub const HEADER_SIZE: usize = 1 + 4 + 4 + 8;

/// Fixed-size fields that precede the decode table and the bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub quality: u8,
    pub height: u32,
    pub width: u32,
    pub bits_count: u64,
}

impl RecordHeader {
    pub fn write<W: Write>(&self, writer: &mut W) -> PackResult<()> {
        writer.write_u8(self.quality)?;
        writer.write_u32::<LittleEndian>(self.height)?;
        writer.write_u32::<LittleEndian>(self.width)?;
        writer.write_u64::<LittleEndian>(self.bits_count)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> PackResult<Self> {
        let quality = reader.read_u8()?;
        let height = reader.read_u32::<LittleEndian>()?;
        let width = reader.read_u32::<LittleEndian>()?;
        let bits_count = reader.read_u64::<LittleEndian>()?;

        let header = Self {
            quality,
            height,
            width,
            bits_count,
        };
        header.validate()?;
        Ok(header)
    }

    pub fn validate(&self) -> PackResult<()> {
        validate_quality(self.quality)?;
        if self.height as usize % BLOCK_SIZE != 0 || self.width as usize % BLOCK_SIZE != 0 {
            return Err(PackError::InvalidFormat(format!(
                "dimensions {}x{} are not multiples of {}",
                self.width, self.height, BLOCK_SIZE
            )));
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of the interleaved RGB raster this record describes.
    pub fn raw_size(&self) -> usize {
        self.pixel_count() * 3
    }
}
