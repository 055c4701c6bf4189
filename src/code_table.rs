//! Per-symbol bit codes derived from a [`HuffmanTree`].

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

/// Longest code a [`Code`] can hold. Reaching it would need counts whose
/// total is far beyond `u64`.
pub const MAX_CODE_LEN: usize = 128;

/// Root-to-leaf path, 0 = left and 1 = right, first step in the high bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    bits: u128,
    len: usize,
}

impl Code {
    const EMPTY: Code = Code { bits: 0, len: 0 };

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(self, bit: bool) -> Result<Code> {
        if self.len >= MAX_CODE_LEN {
            return Err(HuffmanError::invariant(format!(
                "code longer than {} bits",
                MAX_CODE_LEN
            )));
        }
        Ok(Code {
            bits: (self.bits << 1) | bit as u128,
            len: self.len + 1,
        })
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit_pos in (0..self.len).rev() {
            let bit = (self.bits >> bit_pos) & 1;
            f.write_str(if bit == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Walks the tree depth-first with an explicit stack, recording the path
    /// to every leaf. A bare leaf root gets the one-bit code `0`.
    pub fn derive(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = BTreeMap::new();

        if let HuffNode::Leaf { byte, .. } = &tree.root {
            codes.insert(*byte, Code::EMPTY.push(false)?);
            return Ok(CodeTable { codes });
        }

        let mut stack = vec![(&tree.root, Code::EMPTY)];
        while let Some((node, code)) = stack.pop() {
            match node {
                HuffNode::Leaf { byte, .. } => {
                    codes.insert(*byte, code);
                }
                HuffNode::Internal { left, right, .. } => {
                    stack.push((&**right, code.push(true)?));
                    stack.push((&**left, code.push(false)?));
                }
            }
        }

        Ok(CodeTable { codes })
    }

    pub fn get(&self, byte: u8) -> Option<Code> {
        self.codes.get(&byte).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes.iter().map(|(&byte, &code)| (byte, code))
    }

    /// Exact payload length in bits for input with the given frequencies.
    pub fn payload_bits(&self, table: &FrequencyTable) -> Result<u64> {
        table.iter().try_fold(0u64, |acc, (byte, count)| {
            let code = self.get(byte).ok_or_else(|| {
                HuffmanError::invariant(format!("byte {} has no code", byte))
            })?;
            count
                .checked_mul(code.len() as u64)
                .and_then(|bits| acc.checked_add(bits))
                .ok_or_else(|| HuffmanError::invariant("payload bit count overflows u64"))
        })
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (byte, code) in &self.codes {
            writeln!(f, "{} {}", byte, code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes_for(data: &[u8]) -> (FrequencyTable, CodeTable) {
        let table = FrequencyTable::from_bytes(data);
        let tree = HuffmanTree::build(&table).unwrap();
        (table, CodeTable::derive(&tree).unwrap())
    }

    fn sample() -> Vec<u8> {
        let mut data = Vec::new();
        for (i, byte) in (b'a'..=b'z').enumerate() {
            // skewed, with plenty of equal counts
            data.extend(std::iter::repeat(byte).take(1 + (i * i) % 40));
        }
        data.extend_from_slice(b"\x00\x01\xfe\xff");
        data
    }

    #[test]
    fn aaab_gets_one_bit_codes() {
        let (_, codes) = codes_for(b"aaab");
        assert_eq!(codes.get(b'b').unwrap().to_string(), "0");
        assert_eq!(codes.get(b'a').unwrap().to_string(), "1");
        assert_eq!(codes.to_string(), "97 1\n98 0\n");
    }

    #[test]
    fn lone_symbol_gets_single_zero_bit() {
        let (table, codes) = codes_for(b"zzzz");
        let code = codes.get(b'z').unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code.bits(), 0);
        assert_eq!(codes.payload_bits(&table).unwrap(), 4);
    }

    #[test]
    fn every_symbol_has_exactly_one_code() {
        let (table, codes) = codes_for(&sample());
        assert_eq!(codes.len(), table.len());
        for (byte, _) in table.iter() {
            assert!(codes.get(byte).is_some());
        }
    }

    #[test]
    fn codes_are_prefix_free() {
        let (_, codes) = codes_for(&sample());
        let all: Vec<(u8, Code)> = codes.iter().collect();
        for (a, code_a) in &all {
            for (b, code_b) in &all {
                if a != b {
                    assert!(
                        !code_a.is_prefix_of(code_b),
                        "{} ({}) is a prefix of {} ({})",
                        a, code_a, b, code_b
                    );
                }
            }
        }
    }

    #[test]
    fn more_frequent_never_longer() {
        let (table, codes) = codes_for(&sample());
        for (a, freq_a) in table.iter() {
            for (b, freq_b) in table.iter() {
                if freq_a > freq_b {
                    assert!(codes.get(a).unwrap().len() <= codes.get(b).unwrap().len());
                }
            }
        }
    }

    #[test]
    fn code_lengths_fill_the_tree() {
        // Kraft sum of a full binary tree is exactly one
        let (_, codes) = codes_for(&sample());
        let max = codes.iter().map(|(_, c)| c.len()).max().unwrap();
        let kraft: u128 = codes.iter().map(|(_, c)| 1u128 << (max - c.len())).sum();
        assert_eq!(kraft, 1u128 << max);
    }

    #[test]
    fn derivation_is_deterministic() {
        let data = sample();
        assert_eq!(codes_for(&data).1, codes_for(&data).1);
    }

    #[test]
    fn payload_bits_sums_code_lengths() {
        let data = sample();
        let (table, codes) = codes_for(&data);
        let expected: u64 = data.iter().map(|&b| codes.get(b).unwrap().len() as u64).sum();
        assert_eq!(codes.payload_bits(&table).unwrap(), expected);
    }

    #[test]
    fn payload_bits_flags_missing_code() {
        let (_, codes) = codes_for(b"aaab");
        let other = FrequencyTable::from_bytes(b"c");
        assert!(matches!(
            codes.payload_bits(&other),
            Err(HuffmanError::InternalInvariant(_))
        ));
    }

    #[test]
    fn prefix_relation() {
        let (_, codes) = codes_for(b"abcdefgh");
        let a = codes.get(b'a').unwrap();
        assert_eq!(a.to_string(), "000");
        assert!(a.is_prefix_of(&a));
        assert!(!a.is_prefix_of(&codes.get(b'b').unwrap()));
    }
}
