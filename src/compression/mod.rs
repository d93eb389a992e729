pub mod bits;
pub mod color;
pub mod dct;
pub mod engine;
pub mod entropy;
pub mod quantizer;
pub mod zigzag;

pub use bits::{BitReader, BitWriter};
pub use color::{rgb_to_ycbcr, ycbcr_to_rgb, Channel, ColorSpace};
pub use dct::{Block, Dct, BLOCK_AREA, BLOCK_SIZE};
pub use engine::{compress, decompress, CompressionConfig, CompressionEngine};
pub use entropy::{DecodeTable, EncodedStream, HuffmanCode, HuffmanDecoder, HuffmanEncoder};
pub use quantizer::{QuantizationMatrix, QuantizedBlock};
pub use zigzag::{zigzag_scan, zigzag_unscan};
