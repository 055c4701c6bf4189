//! Framing for the encoded payload.
//!
//! A non-empty payload is prefixed with the number of valid bits as a
//! little-endian `u64`, so the decoder can tell trailing code bits from the
//! zero padding of the last byte. Empty input produces no bytes at all.

use std::io::{self, Read, Write};

use crate::error::{HuffmanError, Result};

pub const HEADER_LEN: usize = 8;

pub fn write_header<W: Write>(writer: &mut W, bit_count: u64) -> io::Result<()> {
    writer.write_all(&bit_count.to_le_bytes())
}

/// Reads the bit-count header. `None` means the source was empty, which is
/// how an empty input is encoded.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let mut bit_count_bytes = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut bit_count_bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        HEADER_LEN => Ok(Some(u64::from_le_bytes(bit_count_bytes))),
        n => Err(HuffmanError::truncated(format!(
            "payload header is {} of {} bytes",
            n, HEADER_LEN
        ))),
    }
}

/// Bytes the payload occupies once padded to a byte boundary.
pub fn padded_len(bit_count: u64) -> u64 {
    bit_count.div_ceil(8)
}
