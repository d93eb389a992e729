use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Quality must be in [1,99] interval, got {0}")]
    InvalidQuality(u8),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid compressed image: {0}")]
    InvalidFormat(String),

    #[error("Bitstream truncated: {declared_bits} bits declared, {available_bits} available")]
    Truncated {
        declared_bits: u64,
        available_bits: u64,
    },

    #[error("No Huffman code matches the prefix ending at bit {bit_position}")]
    UnknownCode { bit_position: u64 },

    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Decode table serialization error: {0}")]
    Serialization(String),
}

pub type PackResult<T> = Result<T, PackError>;
