//! Bit-granularity I/O over byte sinks and sources.
//!
//! Bits are packed most-significant first. The writer counts every bit it is
//! handed so the caller can frame the payload; the reader is told that count
//! up front and never hands out padding bits.

use std::io::{self, Read, Write};

use bitstream_io::{BigEndian, BitRead, BitWrite};

use crate::error::{HuffmanError, Result};

pub struct BitWriter<W: Write> {
    inner: bitstream_io::BitWriter<W, BigEndian>,
    bit_count: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        BitWriter {
            inner: bitstream_io::BitWriter::endian(sink, BigEndian),
            bit_count: 0,
        }
    }

    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    pub fn push_bit(&mut self, bit: bool) -> io::Result<()> {
        self.inner.write_bit(bit)?;
        self.bit_count += 1;
        Ok(())
    }

    /// Appends the low `bit_length` bits of `code`, highest first.
    pub fn push_bits(&mut self, code: u128, bit_length: usize) -> io::Result<()> {
        for bit_pos in (0..bit_length).rev() {
            let bit = (code >> bit_pos) & 1;
            self.push_bit(bit != 0)?;
        }
        Ok(())
    }

    /// Zero-pads the final partial byte and flushes. Returns the sink and
    /// the number of payload bits written before padding.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        self.inner.byte_align()?;
        let mut sink = self.inner.into_writer();
        sink.flush()?;
        Ok((sink, self.bit_count))
    }
}

pub struct BitReader<R: Read> {
    inner: bitstream_io::BitReader<R, BigEndian>,
    remaining: u64,
}

impl<R: Read> BitReader<R> {
    /// Reader that yields exactly `valid_bits` bits from `source`.
    pub fn new(source: R, valid_bits: u64) -> Self {
        BitReader {
            inner: bitstream_io::BitReader::endian(source, BigEndian),
            remaining: valid_bits,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Next payload bit, or `None` once every valid bit has been read.
    /// A source that runs dry before that point is a truncated stream.
    pub fn next_bit(&mut self) -> Result<Option<bool>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match self.inner.read_bit() {
            Ok(bit) => {
                self.remaining -= 1;
                Ok(Some(bit))
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(HuffmanError::truncated(
                format!("payload ended with {} valid bits unread", self.remaining),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
