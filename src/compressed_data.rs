use std::io::Cursor;

use crate::error::Result;
use crate::huffman_codec::{EncodeSummary, HuffmanCodec};
use crate::metadata;

/// An encoded artifact held in memory: the framed payload together with the
/// persisted frequency table needed to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    pub payload: Vec<u8>,
    pub frequency_table: Vec<u8>,
}

impl CompressedData {
    pub fn from_bytes(data: &[u8]) -> Result<(Self, EncodeSummary)> {
        let mut payload = Vec::new();
        let mut frequency_table = Vec::new();
        let summary =
            HuffmanCodec::encode(&mut Cursor::new(data), &mut payload, &mut frequency_table)?;
        Ok((
            CompressedData {
                payload,
                frequency_table,
            },
            summary,
        ))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        let mut result = Vec::new();
        HuffmanCodec::decode(
            &self.payload[..],
            &mut result,
            &self.frequency_table[..],
        )?;
        Ok(result)
    }

    /// Valid payload bits recorded in the header.
    pub fn bit_count(&self) -> Result<u64> {
        Ok(metadata::read_header(&mut &self.payload[..])?.unwrap_or(0))
    }

    /// Total stored size, payload plus table.
    pub fn len(&self) -> usize {
        self.payload.len() + self.frequency_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
