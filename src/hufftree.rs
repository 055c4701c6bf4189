//! Huffman tree built by repeatedly merging the two lightest nodes, with
//! ties broken by a unique per-node rank so every build of a table agrees.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::{HeapErr, MinHeap};

impl From<HeapErr> for HuffmanError {
    fn from(e: HeapErr) -> Self {
        HuffmanError::invariant(format!("priority queue misuse: {:?}", e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(b: u8, f: u64) -> Self {
        HuffNode::Leaf { weight: f, byte: b }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// `a` becomes the left child, `b` the right.
    pub fn merge(a: Self, b: Self) -> Self {
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }
}

/// Rank of the first internal node; leaf ranks are their byte values.
const FIRST_INTERNAL_RANK: u64 = 256;

/// Work-queue entry. Ordered by `(weight, rank)`, where `rank` is the byte
/// value for a leaf and `256 + creation order` for a merged node. Every rank
/// is distinct, so extraction order never depends on insertion order.
#[derive(Debug)]
struct QueuedNode {
    rank: u64,
    node: HuffNode,
}

impl QueuedNode {
    fn key(&self) -> (u64, u64) {
        (self.node.weight(), self.rank)
    }
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// A table with one symbol yields a bare leaf as root. An empty table has
    /// no tree; callers must check for it first.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(HuffmanError::invariant(
                "tree construction requires at least one symbol",
            ));
        }

        let nodes: Vec<QueuedNode> = table
            .iter()
            .map(|(byte, count)| QueuedNode {
                rank: byte as u64,
                node: HuffNode::new(byte, count),
            })
            .collect();
        let mut heap = MinHeap::build(nodes);

        let mut next_rank = FIRST_INTERNAL_RANK;
        while heap.heap_size() > 1 {
            let x = heap.extract_min()?;
            let y = heap.extract_min()?;
            heap.insert(QueuedNode {
                rank: next_rank,
                node: HuffNode::merge(x.node, y.node),
            });
            next_rank += 1;
        }

        let root = heap.extract_min()?.node;
        Ok(HuffmanTree { root })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::build(&FrequencyTable::from_bytes(bytes))
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(&self.root, 0usize, "root")];
        while let Some((node, depth, label)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                HuffNode::Leaf { byte, weight } => {
                    let shown = if byte.is_ascii_graphic() { *byte as char } else { '.' };
                    writeln!(
                        f,
                        "{}{}-> Leaf: '{}' ({}) [weight: {}]",
                        indent, label, shown, byte, weight
                    )?;
                }
                HuffNode::Internal { weight, left, right } => {
                    writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, weight)?;
                    // right pushed first so the left subtree prints first
                    stack.push((&**right, depth + 1, "R"));
                    stack.push((&**left, depth + 1, "L"));
                }
            }
        }
        Ok(())
    }
}
