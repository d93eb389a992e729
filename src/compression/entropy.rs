use super::bits::{BitReader, BitWriter};
use crate::error::{PackError, PackResult};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use tracing::debug;

/// Longest code the 64-bit code register can hold.
pub const MAX_CODE_LEN: u8 = 64;

#[derive(Debug, Clone)]
pub struct HuffmanNode {
    pub symbol: Option<u8>,
    pub freq: u64,
    pub left: Option<Box<HuffmanNode>>,
    pub right: Option<Box<HuffmanNode>>,
}

impl HuffmanNode {
    pub fn leaf(symbol: u8, freq: u64) -> Self {
        Self {
            symbol: Some(symbol),
            freq,
            left: None,
            right: None,
        }
    }

    pub fn internal(left: HuffmanNode, right: HuffmanNode) -> Self {
        let freq = left.freq + right.freq;
        Self {
            symbol: None,
            freq,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }
}

/// A code word: `len` bits stored in the low end of `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HuffmanCode {
    pub len: u8,
    pub bits: u64,
}

// Heap entry ordered by weight, then by creation order, so equal weights
// always merge the same way.
struct Pending {
    freq: u64,
    order: usize,
    node: HuffmanNode,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.freq, self.order).cmp(&(other.freq, other.order))
    }
}

/// Code assignment for every byte value present in the input.
pub struct HuffmanTable {
    codes: [Option<HuffmanCode>; 256],
}

impl HuffmanTable {
    pub fn build(freq: &[u64; 256]) -> PackResult<Self> {
        let mut heap: BinaryHeap<Reverse<Pending>> = freq
            .iter()
            .enumerate()
            .filter(|(_, &f)| f > 0)
            .map(|(i, &f)| {
                Reverse(Pending {
                    freq: f,
                    order: i,
                    node: HuffmanNode::leaf(i as u8, f),
                })
            })
            .collect();

        let mut codes = [None; 256];
        let mut order = 256;

        while heap.len() > 1 {
            let (Some(Reverse(first)), Some(Reverse(second))) = (heap.pop(), heap.pop()) else {
                break;
            };
            let node = HuffmanNode::internal(first.node, second.node);
            heap.push(Reverse(Pending {
                freq: node.freq,
                order,
                node,
            }));
            order += 1;
        }

        if let Some(Reverse(root)) = heap.pop() {
            Self::assign_codes(&root.node, 0, 0, &mut codes)?;
        }

        Ok(Self { codes })
    }

    fn assign_codes(
        node: &HuffmanNode,
        bits: u64,
        len: u8,
        codes: &mut [Option<HuffmanCode>; 256],
    ) -> PackResult<()> {
        if let Some(symbol) = node.symbol {
            // A lone symbol sits at the root; give it a one-bit code.
            codes[symbol as usize] = Some(HuffmanCode {
                bits,
                len: len.max(1),
            });
            return Ok(());
        }
        if len == MAX_CODE_LEN {
            return Err(PackError::EncodingError(format!(
                "Huffman code longer than {} bits",
                MAX_CODE_LEN
            )));
        }
        if let Some(ref left) = node.left {
            Self::assign_codes(left, bits << 1, len + 1, codes)?;
        }
        if let Some(ref right) = node.right {
            Self::assign_codes(right, (bits << 1) | 1, len + 1, codes)?;
        }
        Ok(())
    }

    pub fn get(&self, symbol: u8) -> Option<HuffmanCode> {
        self.codes[symbol as usize]
    }

    pub fn decode_table(&self) -> DecodeTable {
        let entries = self
            .codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (c, symbol as u8)))
            .collect();
        DecodeTable { entries }
    }
}

/// Maps every emitted code back to its byte. Carried alongside the
/// bitstream so the decoder never rebuilds the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeTable {
    entries: BTreeMap<HuffmanCode, u8>,
}

impl DecodeTable {
    pub fn lookup(&self, code: HuffmanCode) -> Option<u8> {
        self.entries.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_code_len(&self) -> u8 {
        self.entries.keys().map(|c| c.len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HuffmanCode, &u8)> {
        self.entries.iter()
    }

    /// Number of codes of every length, indexed by length.
    pub fn length_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0usize; self.max_code_len() as usize + 1];
        for code in self.entries.keys() {
            histogram[code.len as usize] += 1;
        }
        histogram
    }

    pub fn encode(&self) -> PackResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| PackError::Serialization(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> PackResult<Self> {
        bincode::deserialize(data).map_err(|e| PackError::Serialization(e.to_string()))
    }
}

/// Output of [`HuffmanEncoder::encode`].
#[derive(Debug, Clone)]
pub struct EncodedStream {
    pub data: Vec<u8>,
    pub table: DecodeTable,
    pub bits_count: u64,
}

pub struct HuffmanEncoder;

impl HuffmanEncoder {
    pub fn encode(input: &[u8]) -> PackResult<EncodedStream> {
        let mut freq = [0u64; 256];
        for &b in input {
            freq[b as usize] += 1;
        }

        let table = HuffmanTable::build(&freq)?;

        let mut writer = BitWriter::with_capacity(input.len() / 2);
        for &b in input {
            let code = table.get(b).ok_or_else(|| {
                PackError::EncodingError(format!("no code assigned to byte {:#04x}", b))
            })?;
            writer.write_bits(code.bits, code.len);
        }
        let (data, bits_count) = writer.finish();

        debug!(
            "huffman: {} bytes -> {} bits, {} symbols",
            input.len(),
            bits_count,
            freq.iter().filter(|&&f| f > 0).count()
        );

        Ok(EncodedStream {
            data,
            table: table.decode_table(),
            bits_count,
        })
    }
}

pub struct HuffmanDecoder;

impl HuffmanDecoder {
    pub fn decode(data: &[u8], table: &DecodeTable, bits_count: u64) -> PackResult<Vec<u8>> {
        let mut reader = BitReader::new(data, bits_count)?;
        let max_len = table.max_code_len();
        let mut output = Vec::new();

        let mut code = HuffmanCode { len: 0, bits: 0 };
        while !reader.is_exhausted() {
            code.bits = (code.bits << 1) | reader.read_bit()? as u64;
            code.len += 1;

            if let Some(symbol) = table.lookup(code) {
                output.push(symbol);
                code = HuffmanCode { len: 0, bits: 0 };
            } else if code.len >= max_len {
                return Err(PackError::UnknownCode {
                    bit_position: reader.position(),
                });
            }
        }

        if code.len > 0 {
            return Err(PackError::DecodingError(format!(
                "stream ends inside a {}-bit partial code",
                code.len
            )));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) -> EncodedStream {
        let encoded = HuffmanEncoder::encode(input).unwrap();
        let decoded =
            HuffmanDecoder::decode(&encoded.data, &encoded.table, encoded.bits_count).unwrap();
        assert_eq!(decoded, input);
        encoded
    }

    fn code_len_sum(input: &[u8], table: &DecodeTable) -> u64 {
        input
            .iter()
            .map(|&b| {
                table
                    .iter()
                    .find(|(_, &s)| s == b)
                    .map(|(c, _)| c.len as u64)
                    .unwrap()
            })
            .sum()
    }

    #[test]
    fn test_mixed_roundtrip() {
        let input = b"abracadabra, zigzag coefficients and zeros: \0\0\0\0\0\0\0\0";
        let encoded = roundtrip(input);
        assert_eq!(encoded.bits_count, code_len_sum(input, &encoded.table));
        assert!(encoded.data.len() < input.len());
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let input = vec![7u8; 100];
        let encoded = roundtrip(&input);
        assert_eq!(encoded.table.len(), 1);
        assert_eq!(encoded.table.max_code_len(), 1);
        assert_eq!(encoded.bits_count, 100);
        assert_eq!(encoded.data.len(), 13);
    }

    #[test]
    fn test_all_byte_values() {
        let input: Vec<u8> = (0..=255u8).cycle().take(256 * 3 + 17).collect();
        let encoded = roundtrip(&input);
        assert_eq!(encoded.table.len(), 256);
        assert_eq!(encoded.bits_count, code_len_sum(&input, &encoded.table));
    }

    #[test]
    fn test_empty_input() {
        let encoded = roundtrip(&[]);
        assert!(encoded.table.is_empty());
        assert_eq!(encoded.bits_count, 0);
        assert!(encoded.data.is_empty());
    }

    #[test]
    fn test_frequent_symbols_get_short_codes() {
        let mut input = vec![0u8; 1000];
        input.extend_from_slice(&[1, 2, 3, 4, 5]);
        let encoded = roundtrip(&input);

        let zero_len = encoded.table.iter().find(|(_, &s)| s == 0).unwrap().0.len;
        assert_eq!(zero_len, 1);
        for (code, _) in encoded.table.iter() {
            assert!(code.len >= zero_len);
        }
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let input: Vec<u8> = (0..200u32).map(|i| (i * i % 37) as u8).collect();
        let encoded = roundtrip(&input);
        let codes: Vec<HuffmanCode> = encoded.table.iter().map(|(c, _)| *c).collect();

        for a in &codes {
            for b in &codes {
                if a == b || a.len > b.len {
                    continue;
                }
                let prefix = b.bits >> (b.len - a.len);
                assert!(prefix != a.bits, "{:?} is a prefix of {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_deterministic_table() {
        let input = b"aabbccddeeff";
        let first = HuffmanEncoder::encode(input).unwrap();
        let second = HuffmanEncoder::encode(input).unwrap();
        assert_eq!(first.table, second.table);
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let encoded = HuffmanEncoder::encode(&[1, 1, 1, 2, 2, 3]).unwrap();
        let mut table = DecodeTable::default();
        for (code, &symbol) in encoded.table.iter() {
            if symbol != 3 {
                table.entries.insert(*code, symbol);
            }
        }
        let result = HuffmanDecoder::decode(&encoded.data, &table, encoded.bits_count);
        assert!(matches!(result, Err(PackError::UnknownCode { .. })));
    }

    #[test]
    fn test_bit_count_past_buffer_is_rejected() {
        let encoded = HuffmanEncoder::encode(b"hello").unwrap();
        let too_many = encoded.data.len() as u64 * 8 + 1;
        let result = HuffmanDecoder::decode(&encoded.data, &encoded.table, too_many);
        assert!(matches!(result, Err(PackError::Truncated { .. })));
    }

    #[test]
    fn test_table_serialization() {
        let encoded = HuffmanEncoder::encode(b"serialize this table").unwrap();
        let bytes = encoded.table.encode().unwrap();
        assert_eq!(DecodeTable::decode(&bytes).unwrap(), encoded.table);
    }
}
