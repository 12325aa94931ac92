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

//! Whitelist files, proof bundles and the root-side membership check.
//!
//! ## Format (TOML)
//! ```text
//! version = 1
//!
//! [tree]                       # optional, defaults shown
//! sort_leaves = true
//! sort_pairs = true
//! odd_nodes = "carry_forward"  # or "duplicate"
//! duplicates = "reject"        # or "dedup"
//!
//! [[entries]]
//! address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
//! capacity = 2                 # integer, decimal string or "0x" hex string
//! ```
//!
//! Each address may appear at most once: the verifier derives the leaf from the caller, so a second
//! entry would give one account two independent allowances.
//!
//! ## Proof bundle (TOML)
//! Output of [`ProofBundle::build`]: the root plus, per entry, its leaf hash and sibling proof, all as
//! `0x` hex. This is what gets handed to clients; only `root` goes on-chain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::hasher::{Keccak256, MerkleHasher};
use crate::core::leaf::{encode_record, parse_capacity, Address, LeafError, Record};
use crate::core::merkle::{verify_with, MerkleError, MerkleTree, TreeOptions};
use crate::core::types::{parse_hash32, to_hex_prefixed, Hash32, HexError};

/// Supported whitelist file version.
pub const WHITELIST_VERSION: u32 = 1;

/// Whitelist loading errors.
#[derive(Debug, Error)]
pub enum WhitelistError {
    /// Cannot read or write a file.
    #[error("read/write: {0}")]
    Read(#[from] std::io::Error),
    /// Cannot parse TOML.
    #[error("parse: {0}")]
    Parse(String),
    /// Cannot serialize TOML.
    #[error("serialize: {0}")]
    Serialize(String),
    /// Whitelist version is unsupported.
    #[error("unsupported whitelist version {0}")]
    UnsupportedVersion(u32),
    /// An entry is malformed.
    #[error("entry {index}: {source}")]
    Entry {
        /// Zero-based entry position.
        index: usize,
        /// Underlying encoding error.
        source: LeafError,
    },
    /// Same address listed more than once.
    #[error("duplicate address {0}")]
    DuplicateAddress(Address),
    /// Tree construction failed.
    #[error("tree: {0}")]
    Tree(#[from] MerkleError),
    /// A bundle hash is malformed.
    #[error("bad hash: {0}")]
    Hash(#[from] HexError),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CapacityValue {
    Int(i64),
    Text(String),
}

impl CapacityValue {
    fn to_u64(&self) -> Result<u64, LeafError> {
        match self {
            Self::Int(v) => u64::try_from(*v).map_err(|_| LeafError::CapacityOverflow),
            Self::Text(s) => parse_capacity(s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    address: String,
    capacity: CapacityValue,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WhitelistFile {
    version: u32,
    #[serde(default)]
    tree: TreeOptions,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

/// A validated whitelist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedWhitelist {
    /// Entries in file order.
    pub records: Vec<Record>,
    /// Tree options from the `[tree]` table.
    pub options: TreeOptions,
}

impl LoadedWhitelist {
    /// Build the Keccak tree for this whitelist.
    pub fn build_tree(&self) -> Result<MerkleTree<Keccak256>, WhitelistError> {
        Ok(MerkleTree::from_records(&self.records, self.options)?)
    }

    /// Find the entry for `address`.
    pub fn find(&self, address: &Address) -> Option<&Record> {
        self.records.iter().find(|r| &r.address == address)
    }
}

/// Parse and validate a whitelist TOML document.
pub fn parse_whitelist_toml(raw: &str) -> Result<LoadedWhitelist, WhitelistError> {
    let file: WhitelistFile =
        toml::from_str(raw).map_err(|e| WhitelistError::Parse(e.to_string()))?;

    if file.version != WHITELIST_VERSION {
        return Err(WhitelistError::UnsupportedVersion(file.version));
    }

    let mut seen: BTreeSet<Address> = BTreeSet::new();
    let mut records = Vec::with_capacity(file.entries.len());
    for (index, e) in file.entries.iter().enumerate() {
        let address: Address = e
            .address
            .parse()
            .map_err(|source| WhitelistError::Entry { index, source })?;
        let capacity = e
            .capacity
            .to_u64()
            .map_err(|source| WhitelistError::Entry { index, source })?;
        if !seen.insert(address) {
            warn!(%address, index, "duplicate whitelist address");
            return Err(WhitelistError::DuplicateAddress(address));
        }
        records.push(Record { address, capacity });
    }

    Ok(LoadedWhitelist {
        records,
        options: file.tree,
    })
}

/// Read and validate a whitelist file.
pub fn load_whitelist(path: impl AsRef<Path>) -> Result<LoadedWhitelist, WhitelistError> {
    let raw = fs::read_to_string(path)?;
    parse_whitelist_toml(&raw)
}

/// Root-side membership check.
///
/// Mirrors a contract that stores only the root and checks `(msg.sender, capacity)` against it.
#[derive(Clone, Copy, Debug)]
pub struct Whitelist<H: MerkleHasher = Keccak256> {
    root: Hash32,
    _hasher: std::marker::PhantomData<fn() -> H>,
}

impl Whitelist<Keccak256> {
    /// Whitelist committed to `root`.
    pub fn new(root: Hash32) -> Self {
        Self::with_hasher(root)
    }
}

impl<H: MerkleHasher> Whitelist<H> {
    /// Whitelist committed to `root`, hashing with `H`.
    pub fn with_hasher(root: Hash32) -> Self {
        Self {
            root,
            _hasher: std::marker::PhantomData,
        }
    }

    /// Committed root.
    pub fn root(&self) -> Hash32 {
        self.root
    }

    /// True iff `(caller, capacity)` is a leaf under the committed root according to `proof`.
    pub fn check_in_whitelist(&self, caller: &Address, proof: &[Hash32], capacity: u64) -> bool {
        let leaf = encode_record(&Record {
            address: *caller,
            capacity,
        })
        .leaf_hash::<H>();
        verify_with::<H>(&self.root, &leaf, proof)
    }
}

// TOML integers are i64; larger capacities round-trip as decimal strings.
mod capacity_serde {
    use super::CapacityValue;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        match i64::try_from(*v) {
            Ok(i) => s.serialize_i64(i),
            Err(_) => s.serialize_str(&v.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        CapacityValue::deserialize(d)?
            .to_u64()
            .map_err(D::Error::custom)
    }
}

/// Proof for one whitelist entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofEntry {
    /// Whitelisted account.
    pub address: Address,
    /// Capacity committed in the leaf.
    #[serde(with = "capacity_serde")]
    pub capacity: u64,
    /// Leaf hash (`0x` hex).
    pub leaf: String,
    /// Sibling hashes from leaf to root (`0x` hex).
    pub proof: Vec<String>,
}

impl ProofEntry {
    /// Decode the proof hashes.
    pub fn proof_hashes(&self) -> Result<Vec<Hash32>, WhitelistError> {
        self.proof
            .iter()
            .map(|h| parse_hash32(h).map_err(WhitelistError::from))
            .collect()
    }
}

/// Root plus per-entry proofs, for distribution to claimants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Root (`0x` hex).
    pub root: String,
    /// One entry per record, in input order.
    pub entries: Vec<ProofEntry>,
}

impl ProofBundle {
    /// Collect proofs for every record from a tree built over them.
    pub fn build<H: MerkleHasher>(
        tree: &MerkleTree<H>,
        records: &[Record],
    ) -> Result<Self, WhitelistError> {
        let mut entries = Vec::with_capacity(records.len());
        for r in records {
            let leaf = encode_record(r).leaf_hash::<H>();
            entries.push(ProofEntry {
                address: r.address,
                capacity: r.capacity,
                leaf: to_hex_prefixed(&leaf),
                proof: tree.hex_proof(&leaf)?,
            });
        }
        Ok(Self {
            root: tree.root_hex(),
            entries,
        })
    }

    /// Decode the root.
    pub fn root_hash(&self) -> Result<Hash32, WhitelistError> {
        Ok(parse_hash32(&self.root)?)
    }

    /// Entry for `address`.
    pub fn entry(&self, address: &Address) -> Option<&ProofEntry> {
        self.entries.iter().find(|e| &e.address == address)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, WhitelistError> {
        toml::to_string_pretty(self).map_err(|e| WhitelistError::Serialize(e.to_string()))
    }

    /// Parse from TOML.
    pub fn from_toml(raw: &str) -> Result<Self, WhitelistError> {
        toml::from_str(raw).map_err(|e| WhitelistError::Parse(e.to_string()))
    }

    /// Write as TOML to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), WhitelistError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
