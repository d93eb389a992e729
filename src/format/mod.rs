pub mod container;
pub mod header;

pub use container::CompressedImage;
pub use header::{RecordHeader, MAGIC};
