use crate::compression::{CompressionConfig, CompressionEngine};
use crate::error::PackResult;
use crate::format::CompressedImage;
use crate::raster::Raster;
use image::DynamicImage;
use std::io::Write;

pub struct Encoder {
    config: CompressionConfig,
}

impl Encoder {
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn with_quality(quality: u8) -> Self {
        Self::new(CompressionConfig::with_quality(quality))
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    /// Compresses without serializing; dimensions are truncated to whole
    /// blocks.
    pub fn compress(&self, image: &DynamicImage) -> PackResult<CompressedImage> {
        let engine = CompressionEngine::new(self.config.clone())?;
        let raster = match image {
            DynamicImage::ImageRgb8(img) => Raster::from_rgb_image(img),
            _ => Raster::from_rgb_image(&image.to_rgb8()),
        };
        engine.compress(&raster)
    }

    pub fn encode<W: Write>(&self, image: &DynamicImage, writer: &mut W) -> PackResult<()> {
        self.compress(image)?.write_to(writer)
    }

    pub fn encode_to_vec(&self, image: &DynamicImage) -> PackResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(image, &mut buf)?;
        Ok(buf)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(CompressionConfig::default())
    }
}
