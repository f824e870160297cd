//! `txdecode` - classify wallet transactions from the command line

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use wallet_txdecoder::config::{self, Config};
use wallet_txdecoder::domain::selectors::{
    selector_hex, ERC20_TRANSFER, ERC20_TRANSFER_SIGNATURE, MULTISIG_METHODS,
};
use wallet_txdecoder::infrastructure::abi::{
    ArtifactStore, DirectoryArtifactStore, EmbeddedArtifacts, LayeredArtifactStore,
    SourcifyExplorer,
};
use wallet_txdecoder::infrastructure::ethereum::{AlloyChainClient, ProviderConfig};
use wallet_txdecoder::logging;
use wallet_txdecoder::store::{LayeredTokenRegistry, SqliteTokenRegistry, TokenRegistry};
use wallet_txdecoder::{
    AbiCache, AbiRepository, ChainAddress, ChainType, RawTransaction, TransactionDecoder,
};

#[derive(Debug, Parser)]
#[command(
    name = "txdecode",
    version,
    about = "Classify raw wallet transactions into typed records"
)]
struct Args {
    /// Config file (default: $TXDECODE_CONFIG or ~/.config/txdecode/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode one RawTransaction JSON object or an array of them
    Decode {
        /// Input file, `-` for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Per-transaction deadline in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print the known method selectors
    Selectors,
    /// Resolve and print a contract's interface
    Abi {
        chain: ChainType,
        address: Address,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    logging::init_tracing(&config.log)?;

    match args.command {
        Command::Decode { input, timeout_ms } => {
            let engine = build_decoder(&config).await?;
            let txs = read_transactions(&input)?;
            decode(&engine, &txs, timeout_ms.map(Duration::from_millis)).await
        }
        Command::Selectors => {
            print_selectors();
            Ok(())
        }
        Command::Abi { chain, address } => {
            let engine = build_decoder(&config).await?;
            print_abi(&engine, ChainAddress::new(chain, address)).await
        }
    }
}

async fn build_decoder(config: &Config) -> Result<TransactionDecoder> {
    let mut stores: Vec<Box<dyn ArtifactStore>> = Vec::new();
    if let Some(dir) = &config.abi.artifact_dir {
        stores.push(Box::new(DirectoryArtifactStore::open(dir)?));
    }
    stores.push(Box::new(EmbeddedArtifacts));

    let explorer = SourcifyExplorer::new(&config.explorer.base_url, config.network_timeout())?;

    let mut chains = AlloyChainClient::new();
    for endpoint in &config.chains {
        chains
            .connect(endpoint.chain, ProviderConfig::from_url(&endpoint.rpc))
            .await
            .with_context(|| format!("connect {}", endpoint.chain))?;
    }

    let repository = AbiRepository::new(
        Arc::new(LayeredArtifactStore::new(stores)),
        Arc::new(explorer),
        Arc::new(chains),
        AbiCache::new(),
        config.repository_options(),
    );

    let mut tokens = LayeredTokenRegistry::default();
    tokens.push(Arc::new(config.static_tokens()?));
    if let Some(path) = config.token_db_path() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let db = SqliteTokenRegistry::open(&path)?;
        tokens.push(Arc::new(db) as Arc<dyn TokenRegistry>);
    }

    Ok(TransactionDecoder::new(Arc::new(repository), Arc::new(tokens)))
}

fn read_transactions(input: &str) -> Result<Vec<RawTransaction>> {
    let content = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("read {input}"))?
    };

    let value: serde_json::Value = serde_json::from_str(&content).context("parse input JSON")?;
    if value.is_array() {
        serde_json::from_value(value).context("parse transactions")
    } else {
        Ok(vec![serde_json::from_value(value).context("parse transaction")?])
    }
}

async fn decode(
    engine: &TransactionDecoder,
    txs: &[RawTransaction],
    deadline: Option<Duration>,
) -> Result<()> {
    let results = match deadline {
        Some(deadline) => {
            futures::future::join_all(txs.iter().map(|tx| engine.decode_within(tx, deadline)))
                .await
        }
        None => engine.decode_all(txs).await,
    };

    let mut out = Vec::with_capacity(results.len());
    for (tx, result) in txs.iter().zip(results) {
        match result {
            Ok(typed) => out.push(serde_json::to_value(&typed)?),
            Err(err) => {
                tracing::error!(tx = %tx.hash, error = %err, "decode failed");
                out.push(json!({ "hash": tx.hash, "error": err.to_string() }));
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_selectors() {
    println!("{:<12} {:<36} {}", "selector", "type", "signature");
    println!(
        "{:<12} {:<36} {}",
        selector_hex(*ERC20_TRANSFER),
        "erc20_transfer",
        ERC20_TRANSFER_SIGNATURE
    );
    for method in MULTISIG_METHODS.iter() {
        println!(
            "{:<12} {:<36} {}",
            selector_hex(method.selector),
            method.tx_type.as_str(),
            method.signature
        );
    }
}

async fn print_abi(engine: &TransactionDecoder, address: ChainAddress) -> Result<()> {
    let abi = engine
        .abis()
        .resolve_by_address(&address)
        .await
        .with_context(|| format!("resolve {address}"))?;

    println!("# {}", abi.source);
    for method in abi.methods() {
        println!("{} {}", method.selector_hex(), method.signature);
    }
    Ok(())
}
