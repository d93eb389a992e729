use super::color::Channel;
use super::dct::{level_shift, Block, Dct, BLOCK_AREA, BLOCK_SIZE};
use super::entropy::{HuffmanDecoder, HuffmanEncoder};
use super::quantizer::{validate_quality, QuantizationMatrix, QuantizedBlock};
use super::zigzag::{zigzag_scan, zigzag_unscan};
use crate::error::{PackError, PackResult};
use crate::format::CompressedImage;
use crate::raster::{Pixel, Raster};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Bytes one block contributes to the flat stream: Y, Cb and Cr runs.
pub const BLOCK_STRIDE: usize = BLOCK_AREA * Channel::ALL.len();

const LEVEL_SHIFT: f64 = 128.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub quality: u8,
    pub parallel: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            quality: 70,
            parallel: true,
        }
    }
}

impl CompressionConfig {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> PackResult<()> {
        validate_quality(self.quality).map(|_| ())
    }
}

/// Offset of a block's channel run inside the flat quantized stream.
///
/// Blocks follow row-major grid order and each block stores its three
/// channels back to back, so decoding must use the same formula.
pub fn block_offset(
    block_row: usize,
    block_col: usize,
    blocks_wide: usize,
    channel: Channel,
) -> usize {
    (block_row * blocks_wide + block_col) * BLOCK_STRIDE + channel.index() * BLOCK_AREA
}

/// Drives the block grid through transform, quantization, scan and
/// entropy coding, and back.
pub struct CompressionEngine {
    config: CompressionConfig,
    dct: Dct,
    matrix: QuantizationMatrix,
}

impl CompressionEngine {
    /// Fails with `InvalidQuality` before any work is done if the
    /// configured quality is outside `[1, 99]`.
    pub fn new(config: CompressionConfig) -> PackResult<Self> {
        config.validate()?;
        let matrix = QuantizationMatrix::for_quality(config.quality)?;
        Ok(Self {
            config,
            dct: Dct::new(),
            matrix,
        })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn matrix(&self) -> &QuantizationMatrix {
        &self.matrix
    }

    /// Level shift, forward DCT, quantization and zigzag scan of one
    /// channel block.
    pub fn encode_block(&self, samples: &Block) -> QuantizedBlock {
        let mut shifted = *samples;
        level_shift(&mut shifted, -LEVEL_SHIFT);
        let freqs = self.dct.forward(&shifted);
        zigzag_scan(&self.matrix.quantize(&freqs))
    }

    /// Exact inverse order of [`encode_block`](Self::encode_block).
    pub fn decode_block(&self, scanned: &[u8]) -> Block {
        let quantized = zigzag_unscan(scanned);
        let freqs = self.matrix.dequantize(&quantized);
        let mut samples = self.dct.inverse(&freqs);
        level_shift(&mut samples, LEVEL_SHIFT);
        samples
    }

    fn encode_grid_block(
        &self,
        raster: &Raster,
        block_row: usize,
        block_col: usize,
        out: &mut [u8],
    ) {
        for channel in Channel::ALL {
            let mut samples = [0.0; BLOCK_AREA];
            for y in 0..BLOCK_SIZE {
                for x in 0..BLOCK_SIZE {
                    let pixel = raster.get(block_row * BLOCK_SIZE + y, block_col * BLOCK_SIZE + x);
                    samples[y * BLOCK_SIZE + x] = pixel.channel(channel);
                }
            }
            let start = channel.index() * BLOCK_AREA;
            out[start..start + BLOCK_AREA].copy_from_slice(&self.encode_block(&samples));
        }
    }

    fn decode_grid_block(&self, stream: &[u8], block_idx: usize, blocks_wide: usize) -> Vec<Pixel> {
        let (block_row, block_col) = (block_idx / blocks_wide, block_idx % blocks_wide);
        let [ys, cbs, crs] = Channel::ALL.map(|channel| {
            let start = block_offset(block_row, block_col, blocks_wide, channel);
            self.decode_block(&stream[start..start + BLOCK_AREA])
        });
        (0..BLOCK_AREA)
            .map(|i| Pixel::from_ycbcr(ys[i], cbs[i], crs[i]))
            .collect()
    }

    /// Quantized, zigzag-ordered bytes of every block, before entropy
    /// coding.
    pub fn quantize_raster(&self, raster: &Raster) -> Vec<u8> {
        let blocks_wide = raster.blocks_wide();
        let mut stream = vec![0u8; raster.blocks_high() * blocks_wide * BLOCK_STRIDE];

        let encode = |(idx, out): (usize, &mut [u8])| {
            self.encode_grid_block(raster, idx / blocks_wide, idx % blocks_wide, out)
        };
        if self.config.parallel {
            stream.par_chunks_mut(BLOCK_STRIDE).enumerate().for_each(encode);
        } else {
            stream.chunks_mut(BLOCK_STRIDE).enumerate().for_each(encode);
        }
        stream
    }

    /// Rebuilds a raster from the flat stream produced by
    /// [`quantize_raster`](Self::quantize_raster).
    pub fn reconstruct_raster(
        &self,
        stream: &[u8],
        height: usize,
        width: usize,
    ) -> PackResult<Raster> {
        // Checked against the stream before anything is allocated for the
        // declared dimensions.
        let blocks_high = height / BLOCK_SIZE;
        let blocks_wide = width / BLOCK_SIZE;
        let expected = blocks_high
            .checked_mul(blocks_wide)
            .and_then(|n| n.checked_mul(BLOCK_STRIDE));
        match expected {
            Some(expected) if expected == stream.len() => {}
            expected => {
                return Err(PackError::DecodingError(format!(
                    "{}x{} needs {} quantized bytes, got {}",
                    width,
                    height,
                    expected.map_or_else(|| "more than usize::MAX".to_string(), |n| n.to_string()),
                    stream.len()
                )));
            }
        }
        let block_count = blocks_high * blocks_wide;
        let mut raster = Raster::new(height, width);

        let blocks: Vec<Vec<Pixel>> = if self.config.parallel {
            (0..block_count)
                .into_par_iter()
                .map(|idx| self.decode_grid_block(stream, idx, blocks_wide))
                .collect()
        } else {
            (0..block_count)
                .map(|idx| self.decode_grid_block(stream, idx, blocks_wide))
                .collect()
        };

        for (idx, pixels) in blocks.iter().enumerate() {
            let row0 = (idx / blocks_wide) * BLOCK_SIZE;
            let col0 = (idx % blocks_wide) * BLOCK_SIZE;
            for y in 0..BLOCK_SIZE {
                for x in 0..BLOCK_SIZE {
                    raster.set(row0 + y, col0 + x, pixels[y * BLOCK_SIZE + x]);
                }
            }
        }

        Ok(raster)
    }

    pub fn compress(&self, raster: &Raster) -> PackResult<CompressedImage> {
        debug!(
            "compressing {}x{} raster at quality {}",
            raster.width(),
            raster.height(),
            self.config.quality
        );

        let stream = self.quantize_raster(raster);
        let encoded = HuffmanEncoder::encode(&stream)?;

        let image = CompressedImage {
            quality: self.config.quality,
            height: raster.height() as u32,
            width: raster.width() as u32,
            bits_count: encoded.bits_count,
            data: encoded.data,
            decode_table: encoded.table,
        };
        info!(
            "compressed {}x{}: {} bits, {} codes, ratio {:.2}",
            image.width,
            image.height,
            image.bits_count,
            image.decode_table.len(),
            image.compression_ratio()
        );
        Ok(image)
    }

    /// Decodes with this engine's tables; the record's quality must match
    /// the one the engine was built for.
    pub fn decompress(&self, image: &CompressedImage) -> PackResult<Raster> {
        if image.quality != self.config.quality {
            return Err(PackError::DecodingError(format!(
                "record quality {} does not match engine quality {}",
                image.quality, self.config.quality
            )));
        }
        image.header().validate()?;

        let stream = HuffmanDecoder::decode(&image.data, &image.decode_table, image.bits_count)?;
        let raster = self.reconstruct_raster(&stream, image.height as usize, image.width as usize)?;
        debug!("decompressed {}x{}", raster.width(), raster.height());
        Ok(raster)
    }
}

pub fn compress(raster: &Raster, quality: u8) -> PackResult<CompressedImage> {
    CompressionEngine::new(CompressionConfig::with_quality(quality))?.compress(raster)
}

/// Decodes a record with the quality it was written with.
pub fn decompress(image: &CompressedImage) -> PackResult<Raster> {
    CompressionEngine::new(CompressionConfig::with_quality(image.quality))?.decompress(image)
}
