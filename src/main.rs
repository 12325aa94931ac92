#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! `whitelist-merkle` CLI: compute whitelist roots, export proofs, verify membership.
//! Results go to stdout, logs to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use whitelist_merkle::core::leaf::{encode_record, parse_capacity, Address, Record};
use whitelist_merkle::core::merkle::verify;
use whitelist_merkle::core::types::{parse_hash32, to_hex_prefixed, Hash32};
use whitelist_merkle::core::whitelist::{load_whitelist, ProofBundle};
use whitelist_merkle::monitoring::logging::{init_logging, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "whitelist-merkle", version, about)]
struct Cli {
    /// Log format: compact or json.
    #[arg(long, global = true, env = "WHITELIST_LOG_FORMAT", default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the root of a whitelist file.
    Root {
        /// Whitelist TOML file.
        file: PathBuf,
    },
    /// Print the encoded leaf and leaf hash of one record.
    Leaf {
        /// Account address (hex).
        #[arg(long)]
        address: String,
        /// Capacity (decimal or 0x hex).
        #[arg(long)]
        capacity: String,
    },
    /// Print the proof for one address, one hash per line.
    Proof {
        /// Whitelist TOML file.
        file: PathBuf,
        /// Account address (hex).
        #[arg(long)]
        address: String,
    },
    /// Write a proof bundle for every entry.
    Proofs {
        /// Whitelist TOML file.
        file: PathBuf,
        /// Output TOML path.
        #[arg(long)]
        out: PathBuf,
    },
    /// Check a leaf and proof against a root. Exits 1 when the check fails.
    Verify {
        /// Committed root (hex).
        #[arg(long)]
        root: String,
        /// Leaf hash (hex). Alternative to --address/--capacity.
        #[arg(long, conflicts_with_all = ["address", "capacity"])]
        leaf: Option<String>,
        /// Account address (hex).
        #[arg(long, requires = "capacity")]
        address: Option<String>,
        /// Capacity (decimal or 0x hex).
        #[arg(long, requires = "address")]
        capacity: Option<String>,
        /// Comma-separated sibling hashes.
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
    },
}

fn record_from_args(address: &str, capacity: &str) -> Result<Record> {
    let address: Address = address.parse().context("bad --address")?;
    let capacity = parse_capacity(capacity).context("bad --capacity")?;
    Ok(Record { address, capacity })
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Root { file } => {
            let wl = load_whitelist(&file)
                .with_context(|| format!("load whitelist {}", file.display()))?;
            let tree = wl.build_tree()?;
            info!(entries = tree.leaf_count(), depth = tree.depth(), "whitelist root computed");
            println!("{}", tree.root_hex());
        }
        Command::Leaf { address, capacity } => {
            let record = record_from_args(&address, &capacity)?;
            let encoded = encode_record(&record);
            println!("encoded = {}", to_hex_prefixed(encoded.as_bytes()));
            println!("leaf = {}", to_hex_prefixed(&whitelist_merkle::leaf_hash(&record)));
        }
        Command::Proof { file, address } => {
            let wl = load_whitelist(&file)
                .with_context(|| format!("load whitelist {}", file.display()))?;
            let address: Address = address.parse().context("bad --address")?;
            let Some(record) = wl.find(&address) else {
                bail!("{address} is not in the whitelist");
            };
            let tree = wl.build_tree()?;
            for h in tree.hex_proof(&whitelist_merkle::leaf_hash(record))? {
                println!("{h}");
            }
        }
        Command::Proofs { file, out } => {
            let wl = load_whitelist(&file)
                .with_context(|| format!("load whitelist {}", file.display()))?;
            let tree = wl.build_tree()?;
            let bundle = ProofBundle::build(&tree, &wl.records)?;
            bundle
                .write_to(&out)
                .with_context(|| format!("write bundle {}", out.display()))?;
            info!(entries = bundle.entries.len(), out = %out.display(), root = %bundle.root, "proof bundle written");
        }
        Command::Verify {
            root,
            leaf,
            address,
            capacity,
            proof,
        } => {
            let root = parse_hash32(&root).context("bad --root")?;
            let leaf: Hash32 = match (leaf, address, capacity) {
                (Some(l), _, _) => parse_hash32(&l).context("bad --leaf")?,
                (None, Some(a), Some(c)) => whitelist_merkle::leaf_hash(&record_from_args(&a, &c)?),
                _ => bail!("either --leaf or --address with --capacity is required"),
            };
            let proof = proof
                .iter()
                .map(|h| parse_hash32(h))
                .collect::<Result<Vec<_>, _>>()
                .context("bad --proof")?;
            let ok = verify(&root, &leaf, &proof);
            println!("{ok}");
            return Ok(ok);
        }
    }
    Ok(true)
}

fn main() {
    let cli = Cli::parse();

    let format = cli.log_format.parse().unwrap_or_else(|_| {
        eprintln!("unknown log format {:?}, using compact", cli.log_format);
        LogFormat::Compact
    });
    let _ = init_logging(format);

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => {
            warn!("membership check failed");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
