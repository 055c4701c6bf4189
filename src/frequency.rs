//! Byte frequency table and its text persistence format.
//!
//! On disk each distinct byte is one line, `BBBBBBBB:N`, where `BBBBBBBB` is
//! the byte as a zero-padded 8-digit binary literal and `N` its decimal count.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Read, Write};

use crate::error::{HuffmanError, Result};

const SCAN_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    /// Reads `source` to exhaustion, counting each byte value.
    pub fn scan<R: Read>(source: &mut R) -> Result<Self> {
        let mut counts = [0u64; 256];
        let mut buf = [0u8; SCAN_CHUNK];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                counts[byte as usize] += 1;
            }
        }

        let counts = (0..=u8::MAX)
            .zip(counts)
            .filter(|&(_, count)| count > 0)
            .collect();
        Ok(FrequencyTable { counts })
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let counts = bytes.iter().copied().fold(BTreeMap::new(), |mut acc, byte| {
            *acc.entry(byte).or_insert(0) += 1;
            acc
        });
        FrequencyTable { counts }
    }

    /// Writes one `BBBBBBBB:N` line per symbol, in ascending symbol order.
    pub fn persist<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for (byte, count) in &self.counts {
            writeln!(sink, "{:08b}:{}", byte, count)?;
        }
        sink.flush()
    }

    /// Parses the persisted form written by [`FrequencyTable::persist`].
    pub fn load<R: BufRead>(source: R) -> Result<Self> {
        let mut counts = BTreeMap::new();
        let mut total: u64 = 0;

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);

            let (byte, count) =
                parse_line(line).map_err(|reason| HuffmanError::format(line_no, reason))?;

            total = total
                .checked_add(count)
                .ok_or_else(|| HuffmanError::format(line_no, "total count overflows u64"))?;
            if counts.insert(byte, count).is_some() {
                return Err(HuffmanError::format(
                    line_no,
                    format!("symbol {:08b} listed twice", byte),
                ));
            }
        }

        Ok(FrequencyTable { counts })
    }

    pub fn get(&self, byte: u8) -> Option<u64> {
        self.counts.get(&byte).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the length of the scanned input.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&byte, &count)| (byte, count))
    }
}

fn parse_line(line: &str) -> std::result::Result<(u8, u64), String> {
    let fields: Vec<&str> = line.split(':').collect();
    let [symbol, count] = fields.as_slice() else {
        return Err(format!("expected 2 ':'-separated fields, found {}", fields.len()));
    };

    if symbol.len() != 8 || !symbol.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(format!("symbol {:?} is not an 8-digit binary literal", symbol));
    }
    let byte = u8::from_str_radix(symbol, 2).map_err(|e| e.to_string())?;

    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("count {:?} is not a decimal number", count));
    }
    let count: u64 = count
        .parse()
        .map_err(|_| format!("count {:?} does not fit in u64", count))?;
    if count == 0 {
        return Err(format!("symbol {} has a zero count", symbol));
    }

    Ok((byte, count))
}
