//! BT.601-style conversion between RGB and YCbCr.
//!
//! The forward coefficients map full-range RGB into studio-range YCbCr;
//! the reverse direction is their algebraic inverse. Both are pure and
//! work on `f64` so that reconstructed samples keep their fractional part
//! until the very last narrowing to `u8`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    YCbCr,
}

/// One of the three luma/chroma planes processed by the block pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Y,
    Cb,
    Cr,
}

impl Channel {
    /// Fixed processing order inside every block.
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::Cb, Channel::Cr];

    pub fn index(self) -> usize {
        match self {
            Channel::Y => 0,
            Channel::Cb => 1,
            Channel::Cr => 2,
        }
    }
}

pub fn rgb_to_ycbcr(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let y = 16.0 + (65.738 * r + 129.057 * g + 24.064 * b) / 256.0;
    let cb = 128.0 + (-37.945 * r - 74.494 * g + 112.439 * b) / 256.0;
    let cr = 128.0 + (112.439 * r - 94.154 * g - 18.285 * b) / 256.0;
    (y, cb, cr)
}

pub fn ycbcr_to_rgb(y: f64, cb: f64, cr: f64) -> (f64, f64, f64) {
    let r = (298.082 * y + 408.583 * cr) / 256.0 - 222.921;
    let g = (298.082 * y - 100.291 * cb - 208.120 * cr) / 256.0 + 135.576;
    let b = (298.082 * y + 516.412 * cb) / 256.0 - 276.836;
    (r, g, b)
}

/// Narrows a reconstructed sample to a byte.
///
/// The inverse transform overshoots `[0, 255]` for saturated colors after
/// quantization, so the value is clamped before the cast instead of
/// relying on float-to-int saturation.
pub fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_maps_to_studio_floor() {
        let (y, cb, cr) = rgb_to_ycbcr(0.0, 0.0, 0.0);
        assert_eq!(y, 16.0);
        assert_eq!(cb, 128.0);
        assert_eq!(cr, 128.0);
    }

    #[test]
    fn test_gray_has_neutral_chroma() {
        for v in [0.0, 64.0, 128.0, 200.0, 255.0] {
            let (_, cb, cr) = rgb_to_ycbcr(v, v, v);
            assert!((cb - 128.0).abs() < 1e-9, "cb {} for gray {}", cb, v);
            assert!((cr - 128.0).abs() < 1e-9, "cr {} for gray {}", cr, v);
        }
    }

    #[test]
    fn test_roundtrip_mid_range() {
        for &(r, g, b) in &[(200.0, 100.0, 50.0), (30.0, 180.0, 90.0), (128.0, 128.0, 128.0)] {
            let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
            let (r2, g2, b2) = ycbcr_to_rgb(y, cb, cr);
            assert!((r - r2).abs() < 1.0, "r {} -> {}", r, r2);
            assert!((g - g2).abs() < 1.0, "g {} -> {}", g, g2);
            assert!((b - b2).abs() < 1.0, "b {} -> {}", b, b2);
        }
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let (r, _, b) = ycbcr_to_rgb(255.0, 255.0, 255.0);
        assert!(r > 255.0 && b > 255.0);
        assert_eq!(to_u8(r), 255);
        assert_eq!(to_u8(-40.0), 0);
        assert_eq!(to_u8(127.6), 128);
    }

    #[test]
    fn test_channel_order() {
        let idx: Vec<usize> = Channel::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
