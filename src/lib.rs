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

//! Whitelist Merkle engine - deterministic allowlist commitments for on-chain verifiers.
//!
//! This crate provides:
//! - A fixed-width, ABI-compatible leaf encoding for `(address, capacity)` records
//! - A sorted-leaf, sorted-pair Merkle tree with Keccak-256 (pluggable at the type level)
//! - Inclusion proofs and boolean verification with bit-exact parity to Solidity verifiers
//! - A TOML whitelist format and proof bundles for distribution
//! - Structured logging helpers for the CLI

/// Core primitives (encoding, hashing, tree, whitelist).
pub mod core;
/// Observability (structured logging setup).
pub mod monitoring;

pub use crate::core::hasher::{Keccak256, MerkleHasher, Sha256};
pub use crate::core::leaf::{encode, encode_record, leaf_hash, Address, EncodedLeaf, LeafError, Record};
pub use crate::core::merkle::{
    verify, verify_positioned, verify_with, DuplicatePolicy, MerkleError, MerkleTree,
    OddNodePolicy, ProofItem, Side, TreeOptions,
};
pub use crate::core::types::Hash32;
pub use crate::core::whitelist::{ProofBundle, Whitelist, WhitelistError};
