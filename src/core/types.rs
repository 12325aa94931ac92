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

//! Shared hash type and `0x`-hex helpers.

use thiserror::Error;

/// Hash32 type (leaf hashes, internal nodes and roots).
pub type Hash32 = [u8; 32];

/// Hex decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    /// Input is not valid hex.
    #[error("invalid hex")]
    InvalidHex,
    /// Decoded value has the wrong length.
    #[error("expected {expected} bytes, got {got}")]
    BadLength {
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        got: usize,
    },
}

/// Strip an optional `0x`/`0X` prefix and surrounding whitespace.
pub fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Lowercase hex with a `0x` prefix.
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex (optionally `0x`-prefixed) into exactly `N` bytes.
pub fn parse_hex_array<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    let bytes = hex::decode(strip_hex_prefix(s)).map_err(|_| HexError::InvalidHex)?;
    if bytes.len() != N {
        return Err(HexError::BadLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Decode a 32-byte hash.
pub fn parse_hash32(s: &str) -> Result<Hash32, HexError> {
    parse_hex_array::<32>(s)
}
