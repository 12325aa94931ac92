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

//! Whitelist records and their fixed-width leaf encoding.
//!
//! The layout is the Ethereum ABI encoding of `(address, uint64)`, i.e. two 32-byte words:
//!
//! ```text
//! 0x00..0x0c  zero
//! 0x0c..0x20  address (20 bytes)
//! 0x20..0x38  zero
//! 0x38..0x40  capacity (u64, big-endian)
//! ```
//!
//! Both fields sit at fixed offsets, so the encoding is injective.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;
use thiserror::Error;

use crate::core::hasher::{Keccak256, MerkleHasher};
use crate::core::types::{strip_hex_prefix, to_hex_prefixed, Hash32};

/// Address length in bytes.
pub const ADDRESS_LEN: usize = 20;
/// ABI word size.
const WORD: usize = 32;
/// Encoded leaf length (two ABI words).
pub const ENCODED_LEAF_LEN: usize = 2 * WORD;

/// Leaf encoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeafError {
    /// Address is not exactly 20 bytes (or not valid hex).
    #[error("invalid address")]
    InvalidAddress,
    /// Capacity does not fit in an unsigned 64-bit integer.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// Capacity text is not an integer.
    #[error("invalid capacity")]
    InvalidCapacity,
}

/// 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self {
        Self(b)
    }

    /// Construct from a slice; fails unless it is exactly 20 bytes.
    pub fn from_slice(b: &[u8]) -> Result<Self, LeafError> {
        let arr: [u8; ADDRESS_LEN] = b.try_into().map_err(|_| LeafError::InvalidAddress)?;
        Ok(Self(arr))
    }

    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = LeafError;

    /// Accepts `0x`-prefixed or bare hex in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(strip_hex_prefix(s)).map_err(|_| LeafError::InvalidAddress)?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for Address {
    type Error = LeafError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex_prefixed(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// One whitelist entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Whitelisted account.
    pub address: Address,
    /// Opaque per-account payload (e.g. max mint allowance).
    pub capacity: u64,
}

impl Record {
    /// Validate untyped inputs into a record.
    pub fn new(address: &[u8], capacity: u128) -> Result<Self, LeafError> {
        Ok(Self {
            address: Address::from_slice(address)?,
            capacity: u64::try_from(capacity).map_err(|_| LeafError::CapacityOverflow)?,
        })
    }
}

/// ABI-encoded `(address, uint64)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedLeaf([u8; ENCODED_LEAF_LEN]);

impl EncodedLeaf {
    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; ENCODED_LEAF_LEN] {
        &self.0
    }

    /// Hash with `H` to obtain the leaf hash.
    pub fn leaf_hash<H: MerkleHasher>(&self) -> Hash32 {
        H::hash(&self.0)
    }
}

impl fmt::Debug for EncodedLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedLeaf({})", to_hex_prefixed(&self.0))
    }
}

/// Encode raw inputs, validating address length and capacity range.
pub fn encode(address: &[u8], capacity: u128) -> Result<EncodedLeaf, LeafError> {
    Ok(encode_record(&Record::new(address, capacity)?))
}

/// Encode a validated record.
pub fn encode_record(record: &Record) -> EncodedLeaf {
    let mut out = [0u8; ENCODED_LEAF_LEN];
    out[WORD - ADDRESS_LEN..WORD].copy_from_slice(record.address.as_bytes());
    out[ENCODED_LEAF_LEN - 8..].copy_from_slice(&record.capacity.to_be_bytes());
    EncodedLeaf(out)
}

/// Keccak-256 leaf hash of a record.
pub fn leaf_hash(record: &Record) -> Hash32 {
    encode_record(record).leaf_hash::<Keccak256>()
}

/// Parse a capacity given as decimal or `0x` hex text.
///
/// Negative values and values above `u64::MAX` are [`LeafError::CapacityOverflow`].
pub fn parse_capacity(s: &str) -> Result<u64, LeafError> {
    let t = s.trim();
    if let Some(rest) = t.strip_prefix('-') {
        return match parse_magnitude(rest)? {
            0 => Ok(0),
            _ => Err(LeafError::CapacityOverflow),
        };
    }
    u64::try_from(parse_magnitude(t)?).map_err(|_| LeafError::CapacityOverflow)
}

fn parse_magnitude(t: &str) -> Result<u128, LeafError> {
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(h) => u128::from_str_radix(h, 16),
        None => t.parse::<u128>(),
    };
    parsed.map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => LeafError::CapacityOverflow,
        _ => LeafError::InvalidCapacity,
    })
}
