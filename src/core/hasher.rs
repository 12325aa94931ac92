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

//! 32-byte digest functions.
//!
//! The hash is chosen at the type level. Encoder, tree and verifier must agree on it, and the
//! external verifier (an EVM contract) uses Keccak-256, so that is the default everywhere.

use ring::digest;
use sha3::Digest;

use crate::core::types::Hash32;

/// A hash function producing 32-byte digests.
pub trait MerkleHasher {
    /// Hash arbitrary bytes.
    fn hash(data: &[u8]) -> Hash32;

    /// Hash the concatenation `left || right`.
    fn hash_concat(left: &Hash32, right: &Hash32) -> Hash32 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(left);
        buf[32..].copy_from_slice(right);
        Self::hash(&buf)
    }
}

/// Keccak-256 (Ethereum flavour, not NIST SHA3-256).
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256;

impl MerkleHasher for Keccak256 {
    fn hash(data: &[u8]) -> Hash32 {
        sha3::Keccak256::digest(data).into()
    }
}

/// SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256;

impl MerkleHasher for Sha256 {
    fn hash(data: &[u8]) -> Hash32 {
        let d = digest::digest(&digest::SHA256, data);
        let mut out = [0u8; 32];
        out.copy_from_slice(d.as_ref());
        out
    }
}
