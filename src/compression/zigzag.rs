use super::dct::{BLOCK_AREA, BLOCK_SIZE};
use super::quantizer::QuantizedBlock;

/// Scan position of every `(row, col)` cell.
pub static ZIGZAG_FORWARD: [[usize; BLOCK_SIZE]; BLOCK_SIZE] = build_forward();

/// `(row, col)` cell visited at every scan position.
pub static ZIGZAG_INVERSE: [(usize, usize); BLOCK_AREA] = build_inverse();

// Walks the anti-diagonals `row + col = s`; odd diagonals run top-right to
// bottom-left, even ones bottom-left to top-right.
const fn build_inverse() -> [(usize, usize); BLOCK_AREA] {
    let mut order = [(0usize, 0usize); BLOCK_AREA];
    let mut pos = 0;
    let mut s = 0;
    while s < 2 * BLOCK_SIZE - 1 {
        let lo = if s >= BLOCK_SIZE { s - (BLOCK_SIZE - 1) } else { 0 };
        let hi = if s < BLOCK_SIZE { s } else { BLOCK_SIZE - 1 };
        let mut k = 0;
        while k <= hi - lo {
            let row = if s % 2 == 1 { lo + k } else { hi - k };
            order[pos] = (row, s - row);
            pos += 1;
            k += 1;
        }
        s += 1;
    }
    order
}

const fn build_forward() -> [[usize; BLOCK_SIZE]; BLOCK_SIZE] {
    let inverse = build_inverse();
    let mut table = [[0usize; BLOCK_SIZE]; BLOCK_SIZE];
    let mut pos = 0;
    while pos < BLOCK_AREA {
        let (row, col) = inverse[pos];
        table[row][col] = pos;
        pos += 1;
    }
    table
}

pub fn zigzag_scan(block: &QuantizedBlock) -> QuantizedBlock {
    let mut output = [0u8; BLOCK_AREA];
    for (row, positions) in ZIGZAG_FORWARD.iter().enumerate() {
        for (col, &pos) in positions.iter().enumerate() {
            output[pos] = block[row * BLOCK_SIZE + col];
        }
    }
    output
}

pub fn zigzag_unscan(scanned: &[u8]) -> QuantizedBlock {
    let mut output = [0u8; BLOCK_AREA];
    for (pos, &(row, col)) in ZIGZAG_INVERSE.iter().enumerate() {
        output[row * BLOCK_SIZE + col] = scanned[pos];
    }
    output
}
