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

use std::fs;

use whitelist_merkle::core::leaf::{Address, LeafError};
use whitelist_merkle::core::merkle::{DuplicatePolicy, OddNodePolicy};
use whitelist_merkle::core::whitelist::{
    load_whitelist, parse_whitelist_toml, ProofBundle, Whitelist, WhitelistError,
};

const SIX: &str = r#"
version = 1

[[entries]]
address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
capacity = 2

[[entries]]
address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
capacity = "2"

[[entries]]
address = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"
capacity = "0x2"

[[entries]]
address = "0x90F79bf6EB2c4f870365E785982E1f101E93b906"
capacity = 2

[[entries]]
address = "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65"
capacity = 2

[[entries]]
address = "0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc"
capacity = 2
"#;

#[test]
fn load_file_and_compute_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("whitelist.toml");
    fs::write(&path, SIX).expect("write");

    let wl = load_whitelist(&path).expect("load");
    assert_eq!(wl.records.len(), 6);
    assert!(wl.records.iter().all(|r| r.capacity == 2));
    assert_eq!(wl.options.odd_nodes, OddNodePolicy::CarryForward);
    assert_eq!(wl.options.duplicates, DuplicatePolicy::Reject);

    let tree = wl.build_tree().expect("tree");
    assert_eq!(
        tree.root_hex(),
        "0x8305992891526c3ea2fadf6f09ac96dbc60906051419f4492e02a792b16fe215"
    );
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    match load_whitelist(&path) {
        Err(WhitelistError::Read(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn tree_table_overrides_defaults() {
    // `[tree]` after the `[[entries]]` array is still a top-level table.
    let raw = format!("{SIX}\n[tree]\nodd_nodes = \"duplicate\"\nduplicates = \"dedup\"\n");
    let wl = parse_whitelist_toml(&raw).expect("parse");
    assert_eq!(wl.options.odd_nodes, OddNodePolicy::Duplicate);
    assert_eq!(wl.options.duplicates, DuplicatePolicy::Dedup);
    assert!(wl.options.sort_leaves);
    assert!(wl.options.sort_pairs);
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        parse_whitelist_toml("version = 2\n"),
        Err(WhitelistError::UnsupportedVersion(2))
    ));
    assert!(matches!(
        parse_whitelist_toml("entries = []\n"),
        Err(WhitelistError::Parse(_))
    ));
    assert!(matches!(
        parse_whitelist_toml(
            "version = 1\n[[entries]]\naddress = \"0x1234\"\ncapacity = 1\n"
        ),
        Err(WhitelistError::Entry {
            index: 0,
            source: LeafError::InvalidAddress
        })
    ));
    assert!(matches!(
        parse_whitelist_toml(
            "version = 1\n[[entries]]\naddress = \"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"\ncapacity = -1\n"
        ),
        Err(WhitelistError::Entry {
            index: 0,
            source: LeafError::CapacityOverflow
        })
    ));
    assert!(matches!(
        parse_whitelist_toml(
            "version = 1\n[[entries]]\naddress = \"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"\ncapacity = \"18446744073709551616\"\n"
        ),
        Err(WhitelistError::Entry {
            index: 0,
            source: LeafError::CapacityOverflow
        })
    ));
    assert!(matches!(
        parse_whitelist_toml(
            "version = 1\n[[entries]]\naddress = \"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"\ncapacity = \"-0x1\"\n"
        ),
        Err(WhitelistError::Entry {
            index: 0,
            source: LeafError::CapacityOverflow
        })
    ));
}

#[test]
fn rejects_repeated_address() {
    let raw = "version = 1\n\
        [[entries]]\naddress = \"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"\ncapacity = 1\n\
        [[entries]]\naddress = \"0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266\"\ncapacity = 5\n";
    let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
    match parse_whitelist_toml(raw) {
        Err(WhitelistError::DuplicateAddress(a)) => assert_eq!(a, expected),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_whitelist_cannot_build_a_tree() {
    let wl = parse_whitelist_toml("version = 1\n").expect("parse");
    assert!(matches!(wl.build_tree(), Err(WhitelistError::Tree(_))));
}

#[test]
fn proof_bundle_round_trip_and_checks() {
    let wl = parse_whitelist_toml(SIX).expect("parse");
    let tree = wl.build_tree().expect("tree");
    let bundle = ProofBundle::build(&tree, &wl.records).expect("bundle");
    assert_eq!(bundle.entries.len(), 6);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("proofs.toml");
    bundle.write_to(&path).expect("write");
    let reread = ProofBundle::from_toml(&fs::read_to_string(&path).unwrap()).expect("read");
    assert_eq!(reread, bundle);

    let whitelist = Whitelist::new(reread.root_hash().unwrap());
    for r in wl.records.iter() {
        let entry = reread.entry(&r.address).expect("entry");
        let proof = entry.proof_hashes().expect("proof");
        assert!(whitelist.check_in_whitelist(&r.address, &proof, entry.capacity));
    }
}

#[test]
fn bundle_write_failure_is_a_read_error() {
    let wl = parse_whitelist_toml(SIX).expect("parse");
    let tree = wl.build_tree().expect("tree");
    let bundle = ProofBundle::build(&tree, &wl.records).expect("bundle");

    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        bundle.write_to(dir.path()),
        Err(WhitelistError::Read(_))
    ));
    assert_eq!(
        WhitelistError::Serialize("bad value".into()).to_string(),
        "serialize: bad value"
    );
    assert!(bundle.to_toml().is_ok());
}

#[test]
fn bundle_keeps_capacities_beyond_toml_integers() {
    let raw = "version = 1\n[[entries]]\naddress = \"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\"\ncapacity = \"18446744073709551615\"\n";
    let wl = parse_whitelist_toml(raw).expect("parse");
    let tree = wl.build_tree().expect("tree");
    let bundle = ProofBundle::build(&tree, &wl.records).expect("bundle");
    let text = bundle.to_toml().expect("toml");
    let back = ProofBundle::from_toml(&text).expect("read");
    assert_eq!(back.entries[0].capacity, u64::MAX);
    assert!(back.entries[0].proof.is_empty());
    assert_eq!(back.entries[0].leaf, back.root);
}
