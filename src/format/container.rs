use super::header::{RecordHeader, HEADER_SIZE, MAGIC};
use crate::compression::entropy::DecodeTable;
use crate::error::{PackError, PackResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// The persisted artifact: everything needed to rebuild the raster.
///
/// Layout after the 8-byte magic: header, `u32` table length, bincode
/// decode table, `u32` data length, packed bits, then a CRC-32 of every
/// byte between the magic and the checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub quality: u8,
    pub height: u32,
    pub width: u32,
    pub bits_count: u64,
    pub data: Vec<u8>,
    pub decode_table: DecodeTable,
}

struct CrcReader<R> {
    inner: R,
    hasher: crc32fast::Hasher,
}

impl<R: Read> Read for CrcReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

fn read_block<R: Read>(reader: &mut R, len: usize) -> PackResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

impl CompressedImage {
    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            quality: self.quality,
            height: self.height,
            width: self.width,
            bits_count: self.bits_count,
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> PackResult<()> {
        let table = self.decode_table.encode()?;

        let mut body = Vec::with_capacity(HEADER_SIZE + 8 + table.len() + self.data.len());
        self.header().write(&mut body)?;
        body.write_u32::<LittleEndian>(table.len() as u32)?;
        body.extend_from_slice(&table);
        body.write_u32::<LittleEndian>(self.data.len() as u32)?;
        body.extend_from_slice(&self.data);

        writer.write_all(MAGIC)?;
        writer.write_all(&body)?;
        writer.write_u32::<LittleEndian>(crc32fast::hash(&body))?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> PackResult<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(PackError::InvalidFormat(
                "bad magic, not a dctpack record".into(),
            ));
        }

        let mut crc_reader = CrcReader {
            inner: &mut *reader,
            hasher: crc32fast::Hasher::new(),
        };

        let header = RecordHeader::read(&mut crc_reader)?;

        let table_len = crc_reader.read_u32::<LittleEndian>()? as usize;
        let table_bytes = read_block(&mut crc_reader, table_len)?;
        if table_bytes.len() != table_len {
            return Err(PackError::InvalidFormat(format!(
                "decode table truncated: {} of {} bytes",
                table_bytes.len(),
                table_len
            )));
        }

        let data_len = crc_reader.read_u32::<LittleEndian>()? as usize;
        let declared_bytes = (header.bits_count + 7) / 8;
        if declared_bytes > data_len as u64 {
            return Err(PackError::Truncated {
                declared_bits: header.bits_count,
                available_bits: data_len as u64 * 8,
            });
        }

        let data = read_block(&mut crc_reader, data_len)?;
        if header.bits_count > data.len() as u64 * 8 {
            return Err(PackError::Truncated {
                declared_bits: header.bits_count,
                available_bits: data.len() as u64 * 8,
            });
        }
        if data.len() != data_len {
            return Err(PackError::InvalidFormat(format!(
                "bitstream truncated: {} of {} bytes",
                data.len(),
                data_len
            )));
        }

        let actual = crc_reader.hasher.finalize();
        let expected = reader.read_u32::<LittleEndian>()?;
        if actual != expected {
            return Err(PackError::CrcMismatch { expected, actual });
        }

        let decode_table = DecodeTable::decode(&table_bytes)?;
        debug!(
            "loaded record {}x{} q{}: {} codes, {} bits",
            header.width,
            header.height,
            header.quality,
            decode_table.len(),
            header.bits_count
        );

        Ok(Self {
            quality: header.quality,
            height: header.height,
            width: header.width,
            bits_count: header.bits_count,
            data,
            decode_table,
        })
    }

    pub fn to_bytes(&self) -> PackResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> PackResult<Self> {
        Self::read_from(&mut bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> PackResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> PackResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    /// Raw RGB size over packed bitstream size.
    pub fn compression_ratio(&self) -> f64 {
        let packed = (self.bits_count as f64 / 8.0).max(1.0);
        self.header().raw_size() as f64 / packed
    }
}
