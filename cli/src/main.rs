//! abicodec CLI: contract ABI encoding and decoding from the command line.
//!
//! # Commands
//! ```text
//! abicodec signature   --sig "transfer(address,uint256)" | --abi <path.json>
//! abicodec encode      --sig "transfer(address,uint256)" 0xd8dA... 1000
//! abicodec decode      --types "(uint256,string)" --data <hex>
//! abicodec decode      --sig "balanceOf(address) returns (uint256)" --data <hex>
//! abicodec decode-log  --abi <path.json> --topics <hex>... --data <hex>
//! abicodec decode-call --abi <path.json> --calldata <hex>
//! ```

use abicodec_registry::{load_from_description, parse_topic_list, MemoryRegistry};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_decode;
mod cmd_encode;
mod cmd_signature;
mod config;
mod logging;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "abicodec",
    about = "Contract ABI codec: selectors, calldata, return values and event logs",
    version
)]
struct Cli {
    /// YAML config file (log and codec settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical form, selector and topic of signatures
    Signature {
        /// Compact signature or JSON ABI item
        #[arg(long)]
        sig: Vec<String>,
        /// Path to an ABI JSON file
        #[arg(long)]
        abi: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a function call (or constructor arguments) from text arguments
    Encode {
        /// Function or constructor signature
        #[arg(long)]
        sig: String,
        /// One text value per parameter, e.g. `0xd8dA...`, `-5`, `["a","b"]`
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an ABI-encoded value list or a function's return data
    Decode {
        /// A type or tuple of types, e.g. `(uint256,string[])`
        #[arg(long, conflicts_with = "sig", required_unless_present = "sig")]
        types: Option<String>,
        /// Function signature whose `returns (...)` describes the data
        #[arg(long)]
        sig: Option<String>,
        /// Encoded data (0x-prefixed hex)
        #[arg(long)]
        data: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an EVM event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        #[command(flatten)]
        source: SignatureSource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode function call calldata
    #[command(name = "decode-call")]
    DecodeCall {
        /// Raw calldata (0x-prefixed hex)
        #[arg(long)]
        calldata: String,
        #[command(flatten)]
        source: SignatureSource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where candidate signatures come from.
#[derive(clap::Args)]
struct SignatureSource {
    /// Path to an ABI JSON file
    #[arg(long)]
    abi: Option<String>,
    /// Compact signature or JSON ABI item (repeatable)
    #[arg(long)]
    sig: Vec<String>,
    /// Event topic list, e.g. "SetEvent(string,string);TransferEvent(address,uint256)"
    #[arg(long)]
    events: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    if cli.log_json {
        config.log.json = true;
    }
    logging::init_tracing(&config.log);
    tracing::debug!(max_depth = config.codec.max_depth, "configuration loaded");

    match cli.command {
        Commands::Signature { sig, abi, json } => {
            let source = SignatureSource {
                abi,
                sig,
                events: None,
            };
            cmd_signature::run(&source.load()?, json)
        }

        Commands::Encode { sig, args, json } => cmd_encode::run(&sig, &args, json),

        Commands::Decode {
            types,
            sig,
            data,
            json,
        } => cmd_decode::run_decode(&config, types.as_deref(), sig.as_deref(), &data, json),

        Commands::DecodeLog {
            topics,
            data,
            source,
            json,
        } => cmd_decode::run_decode_log(&config, &source.load()?, &topics, &data, json),

        Commands::DecodeCall {
            calldata,
            source,
            json,
        } => cmd_decode::run_decode_call(&config, &source.load()?, &calldata, json),
    }
}

impl SignatureSource {
    /// Collect every signature named on the command line into a registry.
    fn load(&self) -> Result<MemoryRegistry> {
        let mut registry = MemoryRegistry::new();
        if let Some(path) = &self.abi {
            registry
                .load_file(std::path::Path::new(path))
                .with_context(|| format!("load ABI file '{path}'"))?;
        }
        for text in &self.sig {
            let sig = load_from_description(text)
                .with_context(|| format!("parse signature '{text}'"))?;
            registry.add(sig)?;
        }
        if let Some(list) = &self.events {
            for event in parse_topic_list(list).context("parse event topic list")? {
                registry.add(event)?;
            }
        }
        if registry.is_empty() {
            bail!("no signatures given: pass --abi, --sig or --events");
        }
        Ok(registry)
    }
}

/// Decode `0x`-prefixed or bare hex from an argument.
pub(crate) fn hex_arg(what: &str, text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    hex::decode(text.strip_prefix("0x").unwrap_or(text)).with_context(|| format!("invalid {what} hex"))
}
