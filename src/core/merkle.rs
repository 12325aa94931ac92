// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Deterministic Merkle tree for whitelist commitments.
//!
//! leaf = H( abi.encode(address, uint64 capacity) )
//! node = H( min(a, b) || max(a, b) )
//!
//! Leaf hashes are sorted before the first level is paired, so the root does not depend on input
//! order. Pair sorting makes a proof a plain list of sibling hashes: the verifier never needs to know
//! whether a sibling was on the left or right. This matches OpenZeppelin `MerkleProof.verify`.
//!
//! An unpaired trailing node is carried to the next level unchanged by default and contributes no
//! proof element at that level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use crate::core::hasher::{Keccak256, MerkleHasher};
use crate::core::leaf::{encode_record, Record};
use crate::core::types::{to_hex_prefixed, Hash32};

/// Tree construction and proof errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    /// No leaves were supplied.
    #[error("empty input")]
    EmptyInput,
    /// Two inputs produced the same leaf hash (hex).
    #[error("duplicate leaf {0}")]
    DuplicateLeaf(String),
    /// Leaf hash is not part of the tree.
    #[error("leaf not found")]
    LeafNotFound,
}

/// What to do with the last node of a level that has an odd node count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddNodePolicy {
    /// Promote the node unchanged.
    #[default]
    CarryForward,
    /// Pair the node with itself.
    Duplicate,
}

/// What to do when two inputs hash to the same leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with [`MerkleError::DuplicateLeaf`].
    #[default]
    Reject,
    /// Keep a single copy.
    Dedup,
}

/// Tree construction options.
///
/// Defaults reproduce `merkletreejs` with `{ hashLeaves, sortLeaves, sortPairs }` all enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeOptions {
    /// Sort leaf hashes ascending before building.
    pub sort_leaves: bool,
    /// Hash pairs as `H(min || max)` instead of `H(left || right)`.
    pub sort_pairs: bool,
    /// Odd-node handling.
    pub odd_nodes: OddNodePolicy,
    /// Duplicate-leaf handling.
    pub duplicates: DuplicatePolicy,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            sort_leaves: true,
            sort_pairs: true,
            odd_nodes: OddNodePolicy::CarryForward,
            duplicates: DuplicatePolicy::Reject,
        }
    }
}

/// Side of sibling in proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Sibling is left.
    Left,
    /// Sibling is right.
    Right,
}

/// One positioned proof item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofItem {
    /// Whether sibling is left or right of current hash.
    pub side: Side,
    /// Sibling hash.
    pub sibling: Hash32,
}

/// Hash every record's encoding with `H`.
pub fn hash_leaves<H: MerkleHasher>(records: &[Record]) -> Vec<Hash32> {
    records
        .iter()
        .map(|r| encode_record(r).leaf_hash::<H>())
        .collect()
}

/// Sort leaf hashes in ascending byte order.
pub fn sort_leaves(leaves: &mut [Hash32]) {
    leaves.sort_unstable();
}

/// Combine two child hashes. With `sorted`, the smaller hash goes first.
pub fn hash_pair<H: MerkleHasher>(a: &Hash32, b: &Hash32, sorted: bool) -> Hash32 {
    if sorted && b < a {
        H::hash_concat(b, a)
    } else {
        H::hash_concat(a, b)
    }
}

/// Immutable binary Merkle tree over 32-byte leaf hashes.
///
/// `layers[0]` holds the (possibly sorted) leaves, the last layer holds the root.
#[derive(Clone, Debug)]
pub struct MerkleTree<H: MerkleHasher = Keccak256> {
    layers: Vec<Vec<Hash32>>,
    options: TreeOptions,
    _hasher: PhantomData<fn() -> H>,
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Encode and hash every record, then build.
    pub fn from_records(records: &[Record], options: TreeOptions) -> Result<Self, MerkleError> {
        Self::from_leaf_hashes(hash_leaves::<H>(records), options)
    }

    /// Build from leaf hashes that are already computed.
    pub fn from_leaf_hashes(
        mut leaves: Vec<Hash32>,
        options: TreeOptions,
    ) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }
        if options.sort_leaves {
            sort_leaves(&mut leaves);
        }
        let before = leaves.len();
        dedup_leaves(&mut leaves, options)?;
        if leaves.len() != before {
            debug!(dropped = before - leaves.len(), "duplicate leaves removed");
        }

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next = next_level::<H>(&layers[layers.len() - 1], options);
            layers.push(next);
        }

        let tree = Self {
            layers,
            options,
            _hasher: PhantomData,
        };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %tree.root_hex(),
            "merkle tree built"
        );
        Ok(tree)
    }

    /// Root hash.
    pub fn root(&self) -> Hash32 {
        self.layers[self.layers.len() - 1][0]
    }

    /// Root as `0x` hex.
    pub fn root_hex(&self) -> String {
        to_hex_prefixed(&self.root())
    }

    /// Leaf level, in tree order.
    pub fn leaves(&self) -> &[Hash32] {
        &self.layers[0]
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of hashing levels above the leaves (0 for a single leaf).
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// All levels, leaves first.
    pub fn layers(&self) -> &[Vec<Hash32>] {
        &self.layers
    }

    /// Options the tree was built with.
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// Position of `leaf` in the leaf level.
    pub fn leaf_index(&self, leaf: &Hash32) -> Option<usize> {
        let leaves = self.leaves();
        if self.options.sort_leaves {
            leaves.binary_search(leaf).ok()
        } else {
            leaves.iter().position(|l| l == leaf)
        }
    }

    /// Whether `leaf` is in the tree.
    pub fn contains(&self, leaf: &Hash32) -> bool {
        self.leaf_index(leaf).is_some()
    }

    /// Sibling hashes from `leaf` up to the root, one per level that has a sibling.
    pub fn proof(&self, leaf: &Hash32) -> Result<Vec<Hash32>, MerkleError> {
        Ok(self
            .positioned_proof(leaf)?
            .into_iter()
            .map(|item| item.sibling)
            .collect())
    }

    /// [`Self::proof`] as `0x` hex strings.
    pub fn hex_proof(&self, leaf: &Hash32) -> Result<Vec<String>, MerkleError> {
        Ok(self.proof(leaf)?.iter().map(|h| to_hex_prefixed(h)).collect())
    }

    /// Proof carrying the side of each sibling, needed when pairs are not sorted.
    pub fn positioned_proof(&self, leaf: &Hash32) -> Result<Vec<ProofItem>, MerkleError> {
        let mut idx = self.leaf_index(leaf).ok_or(MerkleError::LeafNotFound)?;
        let mut path: Vec<ProofItem> = Vec::with_capacity(self.depth());

        for level in &self.layers[..self.layers.len() - 1] {
            let is_right = (idx % 2) == 1;
            let sib_idx = if is_right { idx - 1 } else { idx + 1 };

            if sib_idx < level.len() {
                path.push(ProofItem {
                    side: if is_right { Side::Left } else { Side::Right },
                    sibling: level[sib_idx],
                });
            } else if self.options.odd_nodes == OddNodePolicy::Duplicate {
                path.push(ProofItem {
                    side: Side::Right,
                    sibling: level[idx],
                });
            }

            idx /= 2;
        }

        Ok(path)
    }

    /// Verify a sibling-hash proof against this tree's root.
    ///
    /// Sibling-only proofs are ambiguous without pair sorting, so this is always `false` for trees
    /// built with `sort_pairs = false`; use [`verify_positioned`] there.
    pub fn verify_leaf(&self, leaf: &Hash32, proof: &[Hash32]) -> bool {
        if self.options.sort_pairs {
            verify_with::<H>(&self.root(), leaf, proof)
        } else {
            false
        }
    }
}

fn dedup_leaves(leaves: &mut Vec<Hash32>, options: TreeOptions) -> Result<(), MerkleError> {
    let mut seen: BTreeSet<Hash32> = BTreeSet::new();
    let mut dup: Option<Hash32> = None;
    leaves.retain(|l| {
        if seen.insert(*l) {
            true
        } else {
            dup.get_or_insert(*l);
            false
        }
    });
    match (dup, options.duplicates) {
        (Some(d), DuplicatePolicy::Reject) => Err(MerkleError::DuplicateLeaf(to_hex_prefixed(&d))),
        _ => Ok(()),
    }
}

fn next_level<H: MerkleHasher>(level: &[Hash32], options: TreeOptions) -> Vec<Hash32> {
    let mut next: Vec<Hash32> = Vec::with_capacity((level.len() + 1) / 2);
    for pair in level.chunks(2) {
        match pair {
            [left, right] => next.push(hash_pair::<H>(left, right, options.sort_pairs)),
            [last] => match options.odd_nodes {
                OddNodePolicy::CarryForward => next.push(*last),
                OddNodePolicy::Duplicate => {
                    next.push(hash_pair::<H>(last, last, options.sort_pairs))
                }
            },
            _ => {}
        }
    }
    next
}

/// Verify a sorted-pair proof with Keccak-256.
///
/// Returns `false` for any mismatch. An empty proof verifies only when `leaf == root`.
pub fn verify(root: &Hash32, leaf: &Hash32, proof: &[Hash32]) -> bool {
    verify_with::<Keccak256>(root, leaf, proof)
}

/// Verify a sorted-pair proof with hasher `H`.
pub fn verify_with<H: MerkleHasher>(root: &Hash32, leaf: &Hash32, proof: &[Hash32]) -> bool {
    let cur = proof
        .iter()
        .fold(*leaf, |acc, sibling| hash_pair::<H>(&acc, sibling, true));
    cur[..].ct_eq(&root[..]).into()
}

/// Verify a positioned proof. With `sort_pairs`, the sides are ignored.
pub fn verify_positioned<H: MerkleHasher>(
    root: &Hash32,
    leaf: &Hash32,
    proof: &[ProofItem],
    sort_pairs: bool,
) -> bool {
    let mut cur = *leaf;
    for item in proof {
        cur = match item.side {
            Side::Left => hash_pair::<H>(&item.sibling, &cur, sort_pairs),
            Side::Right => hash_pair::<H>(&cur, &item.sibling, sort_pairs),
        };
    }
    cur[..].ct_eq(&root[..]).into()
}
