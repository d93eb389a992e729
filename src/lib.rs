pub mod compression;
pub mod converter;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod raster;

pub use compression::{CompressionConfig, CompressionEngine};
pub use converter::Converter;
pub use decoder::{DecodedImage, Decoder};
pub use encoder::Encoder;
pub use error::{PackError, PackResult};
pub use format::{CompressedImage, RecordHeader};
pub use raster::{Pixel, Raster};

pub const VERSION: &str = "0.4.0";
