//! # static_huffman
//!
//! Lossless byte-stream compression with a static Huffman code.
//!
//! Encoding scans the input once to count byte frequencies, persists that
//! table as text, then rewrites the input as a bitstream. Decoding needs the
//! same table to rebuild an identical tree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use static_huffman::HuffmanCodec;
//! use std::path::Path;
//!
//! HuffmanCodec::encode_file(
//!     Path::new("input.txt"),
//!     Path::new("input.enc"),
//!     Path::new(".input_freq.txt"),
//! )?;
//! HuffmanCodec::decode_file(
//!     Path::new("input.enc"),
//!     Path::new("output.txt"),
//!     Path::new(".input_freq.txt"),
//! )?;
//! # Ok::<(), static_huffman::HuffmanError>(())
//! ```

pub mod bit_io;
pub mod code_table;
pub mod compressed_data;
pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;

// Internal modules - not part of public API
mod metadata;
mod min_heap;

pub use code_table::{Code, CodeTable};
pub use compressed_data::CompressedData;
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::{DecodeSummary, EncodeSummary, HuffmanCodec};
pub use hufftree::{HuffNode, HuffmanTree};
