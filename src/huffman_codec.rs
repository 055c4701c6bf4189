use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use tracing::debug;

use crate::bit_io::{BitReader, BitWriter};
use crate::code_table::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};
use crate::metadata::{self, HEADER_LEN};

const CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub input_bytes: u64,
    pub distinct_symbols: usize,
    pub payload_bits: u64,
    /// Header plus padded payload; zero for empty input.
    pub encoded_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub output_bytes: u64,
    pub payload_bits: u64,
}

/// Decoder position in the tree between two payload bits.
#[derive(Clone, Copy)]
enum Cursor<'t> {
    AtRoot,
    Descending(&'t HuffNode),
}

/// Tree and code table for one frequency table. Built fresh for every
/// encode or decode call and dropped at the end of it.
pub struct HuffmanCodec {
    frequencies: FrequencyTable,
    tree: Option<HuffmanTree>,
    encode_table: CodeTable,
}

impl HuffmanCodec {
    /// An empty table gives a codec with no tree, which only accepts empty
    /// input and empty payloads.
    pub fn new(frequencies: FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Ok(HuffmanCodec {
                frequencies,
                tree: None,
                encode_table: CodeTable::default(),
            });
        }

        let tree = HuffmanTree::build(&frequencies)?;
        let encode_table = CodeTable::derive(&tree)?;
        debug!(
            symbols = frequencies.len(),
            total = frequencies.total(),
            "built huffman tree"
        );
        Ok(HuffmanCodec {
            frequencies,
            tree: Some(tree),
            encode_table,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(FrequencyTable::from_bytes(data))
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.encode_table
    }

    /// Scans `source`, persists its frequency table to `freq_sink`, then
    /// rewinds and writes the framed payload to `encoded_sink`.
    pub fn encode<S, W, F>(
        source: &mut S,
        encoded_sink: W,
        freq_sink: F,
    ) -> Result<EncodeSummary>
    where
        S: Read + Seek,
        W: Write,
        F: Write,
    {
        let frequencies = FrequencyTable::scan(source)?;
        Self::new(frequencies)?.write_artifact(source, encoded_sink, freq_sink)
    }

    /// Second half of an encode: persists the table, rewinds `source` and
    /// writes the framed payload.
    fn write_artifact<S, W, F>(
        &self,
        source: &mut S,
        encoded_sink: W,
        freq_sink: F,
    ) -> Result<EncodeSummary>
    where
        S: Read + Seek,
        W: Write,
        F: Write,
    {
        debug!(
            bytes = self.frequencies.total(),
            symbols = self.frequencies.len(),
            "writing frequency table and payload"
        );

        let mut freq_sink = BufWriter::new(freq_sink);
        self.frequencies.persist(&mut freq_sink)?;
        drop(freq_sink);

        source.rewind()?;
        let payload_bits = self.encode_stream(BufReader::new(source), encoded_sink)?;

        let encoded_bytes = if self.frequencies.is_empty() {
            0
        } else {
            HEADER_LEN as u64 + metadata::padded_len(payload_bits)
        };
        Ok(EncodeSummary {
            input_bytes: self.frequencies.total(),
            distinct_symbols: self.frequencies.len(),
            payload_bits,
            encoded_bytes,
        })
    }

    /// Loads the persisted table from `freq_source`, rebuilds the tree and
    /// decodes `encoded_source` into `output_sink`.
    pub fn decode<R, W, F>(
        encoded_source: R,
        output_sink: W,
        freq_source: F,
    ) -> Result<DecodeSummary>
    where
        R: Read,
        W: Write,
        F: BufRead,
    {
        let frequencies = FrequencyTable::load(freq_source)?;
        debug!(
            bytes = frequencies.total(),
            symbols = frequencies.len(),
            "loaded frequency table"
        );
        Self::new(frequencies)?.decode_stream(encoded_source, output_sink)
    }

    pub fn encode_file(input: &Path, encoded: &Path, freq: &Path) -> Result<EncodeSummary> {
        // sinks are created only once the input has been read in full
        let mut source = open_byte_source(input)?;
        let codec = Self::new(FrequencyTable::scan(&mut source)?)?;
        let encoded_sink = open_byte_sink(encoded)?;
        let freq_sink = open_byte_sink(freq)?;
        codec.write_artifact(&mut source, encoded_sink, freq_sink)
    }

    pub fn decode_file(encoded: &Path, output: &Path, freq: &Path) -> Result<DecodeSummary> {
        // a bad table must fail before the output file is truncated
        let freq_source = BufReader::new(open_byte_source(freq)?);
        let codec = Self::new(FrequencyTable::load(freq_source)?)?;
        let encoded_source = open_byte_source(encoded)?;
        let output_sink = open_byte_sink(output)?;
        codec.decode_stream(encoded_source, output_sink)
    }

    /// Writes the header and payload for `source`, returning the number of
    /// payload bits. Every byte of `source` must have a code.
    pub fn encode_stream<R: Read, W: Write>(&self, mut source: R, sink: W) -> Result<u64> {
        if self.tree.is_none() {
            let mut probe = [0u8; 1];
            return match source.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(missing_code(probe[0])),
            };
        }

        let expected_bits = self.encode_table.payload_bits(&self.frequencies)?;
        let mut sink = BufWriter::new(sink);
        metadata::write_header(&mut sink, expected_bits)?;

        let mut writer = BitWriter::new(sink);
        let mut buf = [0u8; CHUNK];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                let code = self.encode_table.get(byte).ok_or_else(|| missing_code(byte))?;
                writer.push_bits(code.bits(), code.len())?;
            }
        }

        let (_, written_bits) = writer.finish()?;
        if written_bits != expected_bits {
            return Err(HuffmanError::invariant(format!(
                "wrote {} payload bits, frequency table predicts {}",
                written_bits, expected_bits
            )));
        }
        debug!(bits = written_bits, "wrote payload");
        Ok(written_bits)
    }

    /// Walks the tree one payload bit at a time, emitting a byte at every
    /// leaf. Stops after the header's bit count; padding is never read.
    pub fn decode_stream<R: Read, W: Write>(&self, source: R, sink: W) -> Result<DecodeSummary> {
        let mut source = BufReader::new(source);
        let payload_bits = metadata::read_header(&mut source)?.unwrap_or(0);
        let expected_symbols = self.frequencies.total();

        let Some(tree) = &self.tree else {
            if payload_bits > 0 {
                return Err(HuffmanError::Format(format!(
                    "table is empty but the payload holds {} bits",
                    payload_bits
                )));
            }
            return Ok(DecodeSummary {
                output_bytes: 0,
                payload_bits: 0,
            });
        };

        let mut reader = BitReader::new(source, payload_bits);
        let mut out = BufWriter::new(sink);
        let mut cursor = Cursor::AtRoot;
        let mut emitted: u64 = 0;

        while let Some(bit) = reader.next_bit()? {
            let from = match cursor {
                Cursor::AtRoot => &tree.root,
                Cursor::Descending(node) => node,
            };
            // a leaf can only be `from` when it is the root of a one-symbol tree
            let target = match from {
                HuffNode::Leaf { .. } => from,
                HuffNode::Internal { left, right, .. } => {
                    if bit {
                        &**right
                    } else {
                        &**left
                    }
                }
            };

            match target {
                HuffNode::Leaf { byte, .. } => {
                    if emitted == expected_symbols {
                        return Err(HuffmanError::Format(format!(
                            "payload holds more than the {} symbols the table counts",
                            expected_symbols
                        )));
                    }
                    out.write_all(&[*byte])?;
                    emitted += 1;
                    cursor = Cursor::AtRoot;
                }
                HuffNode::Internal { .. } => cursor = Cursor::Descending(target),
            }
        }

        if let Cursor::Descending(_) = cursor {
            return Err(HuffmanError::truncated(format!(
                "payload ended part way through a code after {} symbols",
                emitted
            )));
        }
        if emitted < expected_symbols {
            return Err(HuffmanError::truncated(format!(
                "payload decoded to {} of {} symbols",
                emitted, expected_symbols
            )));
        }

        out.flush()?;
        debug!(bytes = emitted, bits = payload_bits, "decoded payload");
        Ok(DecodeSummary {
            output_bytes: emitted,
            payload_bits,
        })
    }
}

fn missing_code(byte: u8) -> HuffmanError {
    HuffmanError::invariant(format!("byte {} not in encode table", byte))
}

fn with_path(path: &Path, e: io::Error) -> HuffmanError {
    HuffmanError::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}

pub fn open_byte_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| with_path(path, e))
}

pub fn open_byte_sink(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| with_path(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    fn encode_bytes(data: &[u8]) -> (Vec<u8>, Vec<u8>, EncodeSummary) {
        let mut encoded = Vec::new();
        let mut freq = Vec::new();
        let summary =
            HuffmanCodec::encode(&mut IoCursor::new(data), &mut encoded, &mut freq).unwrap();
        (encoded, freq, summary)
    }

    fn decode_bytes(encoded: &[u8], freq: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        HuffmanCodec::decode(encoded, &mut out, freq)?;
        Ok(out)
    }

    fn round_trip(data: &[u8]) {
        let (encoded, freq, summary) = encode_bytes(data);
        assert_eq!(summary.input_bytes, data.len() as u64);
        assert_eq!(summary.encoded_bytes, encoded.len() as u64);
        assert_eq!(decode_bytes(&encoded, &freq).unwrap(), data);
    }

    /// Deterministic skewed byte stream.
    fn pseudo_random(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let r = (state >> 33) as u32;
                // squaring skews the distribution toward low bytes
                ((r % 256) * (r % 256) / 256) as u8
            })
            .collect()
    }

    #[test]
    fn aaab_scenario() {
        let (encoded, freq, summary) = encode_bytes(b"aaab");
        assert_eq!(String::from_utf8(freq.clone()).unwrap(), "01100001:3\n01100010:1\n");
        assert_eq!(summary.payload_bits, 4);
        assert_eq!(summary.distinct_symbols, 2);
        // b = 0, a = 1
        assert_eq!(encoded, vec![4, 0, 0, 0, 0, 0, 0, 0, 0b1110_0000]);
        assert_eq!(decode_bytes(&encoded, &freq).unwrap(), b"aaab");
    }

    #[test]
    fn empty_scenario() {
        let (encoded, freq, summary) = encode_bytes(b"");
        assert!(encoded.is_empty());
        assert!(freq.is_empty());
        assert_eq!(summary.payload_bits, 0);
        assert_eq!(decode_bytes(&encoded, &freq).unwrap(), b"");
    }

    #[test]
    fn single_symbol_scenario() {
        let (encoded, freq, summary) = encode_bytes(b"zzzz");
        assert_eq!(summary.payload_bits, 4);
        assert_eq!(encoded, vec![4, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_bytes(&encoded, &freq).unwrap(), b"zzzz");
    }

    #[test]
    fn round_trips() {
        round_trip(b"a");
        round_trip(b"ab");
        round_trip(b"hello, world");
        round_trip(&(0..=255u8).collect::<Vec<_>>());
        round_trip(&(0..=255u8).cycle().take(10_000).collect::<Vec<_>>());
        round_trip(&pseudo_random(50_000, 7));
        round_trip(&vec![0u8; 70_000]);
    }

    #[test]
    fn skewed_input_compresses() {
        let data = pseudo_random(20_000, 3);
        let (_, _, summary) = encode_bytes(&data);
        assert!(summary.payload_bits < data.len() as u64 * 8);
    }

    #[test]
    fn independent_calls_do_not_share_state() {
        let (enc_a, freq_a, _) = encode_bytes(b"first input, mostly letters");
        let (enc_b, freq_b, _) = encode_bytes(&[0xff, 0x00, 0xff, 0x10]);
        assert_eq!(decode_bytes(&enc_b, &freq_b).unwrap(), vec![0xff, 0x00, 0xff, 0x10]);
        assert_eq!(decode_bytes(&enc_a, &freq_a).unwrap(), b"first input, mostly letters");
        // re-encoding gives byte-identical artifacts
        assert_eq!(encode_bytes(b"first input, mostly letters").0, enc_a);
    }

    #[test]
    fn table_line_order_does_not_matter() {
        let (encoded, freq, _) = encode_bytes(b"abracadabra");
        let text = String::from_utf8(freq).unwrap();
        let reversed: String = text.lines().rev().map(|l| format!("{}\n", l)).collect();
        assert_eq!(decode_bytes(&encoded, reversed.as_bytes()).unwrap(), b"abracadabra");
    }

    #[test]
    fn missing_payload_bytes_are_truncation() {
        let data = pseudo_random(1000, 11);
        let (mut encoded, freq, _) = encode_bytes(&data);
        encoded.pop();
        assert!(matches!(
            decode_bytes(&encoded, &freq),
            Err(HuffmanError::TruncatedStream(_))
        ));
    }

    #[test]
    fn stopping_mid_code_is_truncation() {
        // codes: c = 00, b = 01, a = 1, so the final `c` spans two bits
        let data = b"aaaabbc";
        let (mut encoded, freq, summary) = encode_bytes(data);
        metadata::write_header(&mut &mut encoded[..HEADER_LEN], summary.payload_bits - 1).unwrap();
        assert!(matches!(
            decode_bytes(&encoded, &freq),
            Err(HuffmanError::TruncatedStream(_))
        ));
    }

    #[test]
    fn dropping_final_symbol_is_truncation() {
        let data = b"aaab";
        let (mut encoded, freq, summary) = encode_bytes(data);
        // the final `b` is the single bit `0`
        metadata::write_header(&mut &mut encoded[..HEADER_LEN], summary.payload_bits - 1).unwrap();
        assert!(matches!(
            decode_bytes(&encoded, &freq),
            Err(HuffmanError::TruncatedStream(_))
        ));
    }

    #[test]
    fn payload_longer_than_table_is_format_error() {
        let (mut encoded, freq, summary) = encode_bytes(b"aaab");
        metadata::write_header(&mut &mut encoded[..HEADER_LEN], summary.payload_bits + 1).unwrap();
        assert!(matches!(
            decode_bytes(&encoded, &freq),
            Err(HuffmanError::Format(_))
        ));
    }

    #[test]
    fn empty_table_with_payload_is_format_error() {
        let (encoded, _, _) = encode_bytes(b"aaab");
        assert!(matches!(
            decode_bytes(&encoded, b""),
            Err(HuffmanError::Format(_))
        ));
    }

    #[test]
    fn malformed_table_aborts_before_output() {
        let (encoded, _, _) = encode_bytes(b"aaab");
        let mut out = Vec::new();
        let err = HuffmanCodec::decode(&encoded[..], &mut out, &b"01100001;3\n"[..]).unwrap_err();
        assert!(matches!(err, HuffmanError::Format(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn byte_without_code_is_invariant_error() {
        let codec = HuffmanCodec::from_bytes(b"aaab").unwrap();
        let err = codec.encode_stream(&b"abc"[..], Vec::new()).unwrap_err();
        assert!(matches!(err, HuffmanError::InternalInvariant(_)));

        let empty = HuffmanCodec::new(FrequencyTable::default()).unwrap();
        let err = empty.encode_stream(&b"a"[..], Vec::new()).unwrap_err();
        assert!(matches!(err, HuffmanError::InternalInvariant(_)));
    }

    #[test]
    fn source_differing_from_table_is_invariant_error() {
        let codec = HuffmanCodec::from_bytes(b"aaab").unwrap();
        let err = codec.encode_stream(&b"aaabb"[..], Vec::new()).unwrap_err();
        assert!(matches!(err, HuffmanError::InternalInvariant(_)));
    }

    #[test]
    fn codec_exposes_tree_and_codes() {
        let codec = HuffmanCodec::from_bytes(b"aaab").unwrap();
        assert_eq!(codec.frequencies().total(), 4);
        assert_eq!(codec.tree().unwrap().root.weight(), 4);
        assert_eq!(codec.code_table().len(), 2);
        assert!(HuffmanCodec::new(FrequencyTable::default()).unwrap().tree().is_none());
    }

    #[test]
    fn unopenable_paths_are_io_errors() {
        let missing = Path::new("/nonexistent/dir/input.bin");
        assert!(matches!(open_byte_source(missing), Err(HuffmanError::Io(_))));
        assert!(matches!(open_byte_sink(missing), Err(HuffmanError::Io(_))));
    }
}
