use crate::compression::color::{rgb_to_ycbcr, to_u8, ycbcr_to_rgb, Channel, ColorSpace};
use crate::compression::dct::BLOCK_SIZE;
use crate::error::{PackError, PackResult};
use image::RgbImage;

/// Three components tagged with the space they are expressed in. The
/// other space is computed on demand by the accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    space: ColorSpace,
    c: [f64; 3],
}

impl Pixel {
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self {
            space: ColorSpace::Rgb,
            c: [r, g, b],
        }
    }

    pub fn from_ycbcr(y: f64, cb: f64, cr: f64) -> Self {
        Self {
            space: ColorSpace::YCbCr,
            c: [y, cb, cr],
        }
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn rgb(&self) -> (f64, f64, f64) {
        match self.space {
            ColorSpace::Rgb => (self.c[0], self.c[1], self.c[2]),
            ColorSpace::YCbCr => ycbcr_to_rgb(self.c[0], self.c[1], self.c[2]),
        }
    }

    pub fn ycbcr(&self) -> (f64, f64, f64) {
        match self.space {
            ColorSpace::YCbCr => (self.c[0], self.c[1], self.c[2]),
            ColorSpace::Rgb => rgb_to_ycbcr(self.c[0], self.c[1], self.c[2]),
        }
    }

    pub fn channel(&self, channel: Channel) -> f64 {
        if self.space == ColorSpace::YCbCr {
            return self.c[channel.index()];
        }
        let (y, cb, cr) = self.ycbcr();
        match channel {
            Channel::Y => y,
            Channel::Cb => cb,
            Channel::Cr => cr,
        }
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let (r, g, b) = self.rgb();
        [to_u8(r), to_u8(g), to_u8(b)]
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Self::from_rgb(0.0, 0.0, 0.0)
    }
}

/// Truncates a dimension to a whole number of blocks.
pub fn block_aligned(dim: usize) -> usize {
    dim - dim % BLOCK_SIZE
}

/// Row-major pixel grid whose dimensions are always multiples of
/// [`BLOCK_SIZE`]; constructors drop any remainder rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    height: usize,
    width: usize,
    pixels: Vec<Pixel>,
}

impl Raster {
    /// Black raster.
    pub fn new(height: usize, width: usize) -> Self {
        let height = block_aligned(height);
        let width = block_aligned(width);
        Self {
            height,
            width,
            pixels: vec![Pixel::default(); height * width],
        }
    }

    pub fn from_fn<F: FnMut(usize, usize) -> Pixel>(height: usize, width: usize, mut f: F) -> Self {
        let mut raster = Self::new(height, width);
        for row in 0..raster.height {
            for col in 0..raster.width {
                raster.pixels[row * raster.width + col] = f(row, col);
            }
        }
        raster
    }

    /// Builds a raster from interleaved RGB bytes of a `width x height`
    /// image.
    pub fn from_rgb(width: usize, height: usize, data: &[u8]) -> PackResult<Self> {
        let expected = width * height * 3;
        if data.len() < expected {
            return Err(PackError::InvalidFormat(format!(
                "RGB buffer too short: expected {} bytes, got {}",
                expected,
                data.len()
            )));
        }
        Ok(Self::from_fn(height, width, |row, col| {
            let i = (row * width + col) * 3;
            Pixel::from_rgb(data[i] as f64, data[i + 1] as f64, data[i + 2] as f64)
        }))
    }

    pub fn from_rgb_image(image: &RgbImage) -> Self {
        Self::from_fn(image.height() as usize, image.width() as usize, |row, col| {
            let p = image.get_pixel(col as u32, row as u32);
            Pixel::from_rgb(p[0] as f64, p[1] as f64, p[2] as f64)
        })
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.get(y as usize, x as usize).to_rgb8())
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn blocks_high(&self) -> usize {
        self.height / BLOCK_SIZE
    }

    pub fn blocks_wide(&self) -> usize {
        self.width / BLOCK_SIZE
    }

    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, pixel: Pixel) {
        self.pixels[row * self.width + col] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }
}
