use std::f64::consts::PI;

/// Edge length of every transform block.
pub const BLOCK_SIZE: usize = 8;

/// Number of samples in one block.
pub const BLOCK_AREA: usize = BLOCK_SIZE * BLOCK_SIZE;

/// A block of samples or coefficients, row-major: `block[x * BLOCK_SIZE + y]`.
pub type Block = [f64; BLOCK_AREA];

const INV_SQRT_2: f64 = 0.7071067811865475;

fn alpha(u: usize) -> f64 {
    if u == 0 {
        INV_SQRT_2
    } else {
        1.0
    }
}

/// Direct 2-D DCT-II over 8x8 blocks with precomputed cosine bases.
///
/// Both tables hold `cos((2p + 1) * q * PI / 2N)`; the first is walked
/// along block rows (`x`, `u`), the second along columns (`y`, `v`).
/// They are built once and only read afterwards, so one `Dct` can be
/// shared across worker threads.
#[derive(Debug, Clone)]
pub struct Dct {
    beta: f64,
    xu_cos: [[f64; BLOCK_SIZE]; BLOCK_SIZE],
    yv_cos: [[f64; BLOCK_SIZE]; BLOCK_SIZE],
}

impl Dct {
    pub fn new() -> Self {
        let n = BLOCK_SIZE as f64;
        let mut xu_cos = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        let mut yv_cos = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];

        for p in 0..BLOCK_SIZE {
            for q in 0..BLOCK_SIZE {
                let c = ((2.0 * p as f64 + 1.0) * q as f64 * PI / (2.0 * n)).cos();
                xu_cos[p][q] = c;
                yv_cos[p][q] = c;
            }
        }

        Self {
            beta: 1.0 / n + 1.0 / n,
            xu_cos,
            yv_cos,
        }
    }

    #[inline]
    fn basis(&self, a: f64, u: usize, v: usize, x: usize, y: usize) -> f64 {
        a * self.xu_cos[x][u] * self.yv_cos[y][v]
    }

    pub fn forward(&self, input: &Block) -> Block {
        let mut coeffs = [0.0; BLOCK_AREA];

        for u in 0..BLOCK_SIZE {
            for v in 0..BLOCK_SIZE {
                let mut sum = 0.0;
                for x in 0..BLOCK_SIZE {
                    for y in 0..BLOCK_SIZE {
                        sum += self.basis(input[x * BLOCK_SIZE + y], u, v, x, y);
                    }
                }
                coeffs[u * BLOCK_SIZE + v] = sum * self.beta * alpha(u) * alpha(v);
            }
        }

        coeffs
    }

    pub fn inverse(&self, coeffs: &Block) -> Block {
        let mut output = [0.0; BLOCK_AREA];

        for x in 0..BLOCK_SIZE {
            for y in 0..BLOCK_SIZE {
                let mut sum = 0.0;
                for u in 0..BLOCK_SIZE {
                    for v in 0..BLOCK_SIZE {
                        sum += self.basis(coeffs[u * BLOCK_SIZE + v], u, v, x, y)
                            * alpha(u)
                            * alpha(v);
                    }
                }
                output[x * BLOCK_SIZE + y] = sum * self.beta;
            }
        }

        output
    }
}

impl Default for Dct {
    fn default() -> Self {
        Self::new()
    }
}

/// Adds `shift` to every sample; `-128` before the forward transform,
/// `+128` after the inverse.
pub fn level_shift(block: &mut Block, shift: f64) {
    for v in block.iter_mut() {
        *v += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_random_block_roundtrip() {
        let dct = Dct::new();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..32 {
            let mut block = [0.0; BLOCK_AREA];
            for v in block.iter_mut() {
                *v = rng.gen_range(0.0..=255.0);
            }
            let restored = dct.inverse(&dct.forward(&block));
            for (a, b) in block.iter().zip(restored.iter()) {
                assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_zero_block_has_zero_spectrum() {
        let dct = Dct::new();
        let coeffs = dct.forward(&[0.0; BLOCK_AREA]);
        assert!(coeffs.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_flat_block_is_dc_only() {
        let dct = Dct::new();
        let coeffs = dct.forward(&[10.0; BLOCK_AREA]);

        assert!((coeffs[0] - 80.0).abs() < 1e-9, "dc {}", coeffs[0]);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-9);
        }
    }

    #[test]
    fn test_level_shift() {
        let mut block = [128.0; BLOCK_AREA];
        level_shift(&mut block, -128.0);
        assert!(block.iter().all(|&v| v == 0.0));
    }
}
