use crate::compression::{CompressionConfig, CompressionEngine};
use crate::error::PackResult;
use crate::format::{CompressedImage, RecordHeader};
use image::{DynamicImage, RgbImage};
use std::io::Read;

pub struct DecodedImage {
    pub image: DynamicImage,
    pub header: RecordHeader,
}

impl DecodedImage {
    pub fn rgb(&self) -> Option<&RgbImage> {
        self.image.as_rgb8()
    }
}

pub struct Decoder {
    parallel: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn decompress(&self, record: &CompressedImage) -> PackResult<DecodedImage> {
        let config = CompressionConfig {
            quality: record.quality,
            parallel: self.parallel,
        };
        let raster = CompressionEngine::new(config)?.decompress(record)?;

        Ok(DecodedImage {
            image: DynamicImage::ImageRgb8(raster.to_rgb_image()),
            header: record.header(),
        })
    }

    pub fn decode<R: Read>(&self, mut reader: R) -> PackResult<DecodedImage> {
        let record = CompressedImage::read_from(&mut reader)?;
        self.decompress(&record)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
