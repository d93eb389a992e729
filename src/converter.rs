use crate::decoder::{DecodedImage, Decoder};
use crate::encoder::Encoder;
use crate::error::PackResult;
use crate::format::CompressedImage;
use image::DynamicImage;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// File-level conversion between ordinary image formats and packed
/// records. The output image format follows the file extension.
pub struct Converter {
    quality: u8,
}

impl Converter {
    pub fn new() -> Self {
        Self { quality: 70 }
    }

    /// Quality is checked when a conversion runs, not here.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> PackResult<CompressedImage> {
        let img = image::open(input)?;
        self.compress_image(&img, output)
    }

    pub fn compress_image<P: AsRef<Path>>(
        &self,
        image: &DynamicImage,
        output: P,
    ) -> PackResult<CompressedImage> {
        let record = Encoder::with_quality(self.quality).compress(image)?;
        let mut writer = BufWriter::new(File::create(output)?);
        record.write_to(&mut writer)?;
        writer.flush()?;
        Ok(record)
    }

    pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> PackResult<DecodedImage> {
        let decoded = self.load(input)?;
        decoded.image.save(output)?;
        Ok(decoded)
    }

    pub fn load<P: AsRef<Path>>(&self, input: P) -> PackResult<DecodedImage> {
        let reader = BufReader::new(File::open(input)?);
        Decoder::new().decode(reader)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
