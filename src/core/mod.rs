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

/// Digest functions used for leaves and internal nodes.
pub mod hasher;
/// Record types and the fixed-width leaf encoding.
pub mod leaf;
/// Sorted-pair Merkle tree, proofs and verification.
pub mod merkle;
/// Shared hash type and hex helpers.
pub mod types;
/// Whitelist file format, proof bundles and the root-side membership check.
pub mod whitelist;
