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

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use whitelist_merkle::core::leaf::{leaf_hash, Address, Record};
use whitelist_merkle::core::merkle::{verify, DuplicatePolicy, MerkleTree, OddNodePolicy, TreeOptions};
use whitelist_merkle::Keccak256;

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    entries: Vec<([u8; 20], u64)>,
    index: u16,
    duplicate_odd: bool,
    forged: Vec<[u8; 32]>,
}

fuzz_target!(|inp: Input| {
    let records: Vec<Record> = inp
        .entries
        .iter()
        .map(|(a, c)| Record { address: Address::from_bytes(*a), capacity: *c })
        .collect();
    let opts = TreeOptions {
        odd_nodes: if inp.duplicate_odd { OddNodePolicy::Duplicate } else { OddNodePolicy::CarryForward },
        duplicates: DuplicatePolicy::Dedup,
        ..TreeOptions::default()
    };

    let Ok(tree) = MerkleTree::<Keccak256>::from_records(&records, opts) else {
        assert!(records.is_empty());
        return;
    };
    let idx = (inp.index as usize) % records.len();
    let leaf = leaf_hash(&records[idx]);

    let proof = tree.proof(&leaf).expect("member leaf has a proof");
    assert!(verify(&tree.root(), &leaf, &proof));

    // Arbitrary proofs must never panic.
    let _ = verify(&tree.root(), &leaf, &inp.forged);
});
