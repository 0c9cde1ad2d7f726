//! Token Sweeper CLI
//!
//! Command-line interface for discovering and sweeping mnemonic wallet
//! assets. The mnemonic phrase is read from the MNEMONIC environment variable
//! so it never appears in shell history or process listings.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use token_sweeper::chain::RpcChainClient;
use token_sweeper::claims::ClaimRedeemer;
use token_sweeper::{
    Config, DepositBuilder, DiscoveryEngine, Error, MnemonicWallet, Result, SweepExecutor,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "token-sweeper")]
#[command(about = "Discover and sweep mnemonic wallet assets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every sweepable asset position for the derived wallet
    Discover,

    /// Sweep one discovered position to a destination address
    Sweep {
        /// Position index from `discover` output
        #[arg(long)]
        asset: usize,

        /// Destination address
        #[arg(long)]
        to: String,
    },

    /// Create claim records for a list of recipients
    CreateClaims {
        /// Token contract address
        #[arg(long)]
        token: String,

        /// File with one recipient address per line
        #[arg(long)]
        recipients: PathBuf,

        /// Quantity per recipient, in the token's smallest unit
        #[arg(long)]
        amount: String,
    },

    /// Withdraw one of the wallet's own unredeemed claims
    Withdraw {
        /// Claim index from `discover` output
        #[arg(long)]
        index: u64,

        /// Claim identifier
        #[arg(long)]
        claim_id: String,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load config
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_env()?
    };

    match cli.command {
        Commands::Discover => run_discover(config).await?,
        Commands::Sweep { asset, to } => run_sweep(config, asset, to).await?,
        Commands::CreateClaims {
            token,
            recipients,
            amount,
        } => run_create_claims(config, token, recipients, amount).await?,
        Commands::Withdraw { index, claim_id } => {
            run_withdraw(config, index, claim_id).await?;
        }
        Commands::Config => {
            let rendered = serde_json::to_string_pretty(&config)
                .map_err(|e| Error::Config(e.to_string()))?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Derive the session wallet from the MNEMONIC environment variable
fn load_wallet() -> Result<MnemonicWallet> {
    let phrase = std::env::var("MNEMONIC")
        .map_err(|_| Error::Config("MNEMONIC not set".to_string()))?;
    MnemonicWallet::from_mnemonic(&phrase)
}

fn chain_client(config: &Config) -> Result<Arc<RpcChainClient>> {
    Ok(Arc::new(RpcChainClient::new(
        &config.rpc_url,
        config.chain_id,
    )?))
}

fn parse_address(raw: &str) -> Result<alloy::primitives::Address> {
    raw.parse()
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", raw, e)))
}

async fn run_discover(config: Config) -> Result<()> {
    let wallet = load_wallet()?;
    let client = chain_client(&config)?;
    let engine = DiscoveryEngine::new(client, config.registry(), config.claims_contract);

    tracing::info!(address = %wallet.address(), "derived wallet");

    let report = engine.discover(wallet.address()).await;

    if report.positions.is_empty() {
        println!("No sweepable assets found for {}", wallet.address());
    } else {
        println!("Assets for {}:", wallet.address());
        for (i, position) in report.positions.iter().enumerate() {
            println!(
                "  [{}] {} {} ({})",
                i,
                position.display_balance(),
                position.name,
                position.kind()
            );
        }
    }

    for failure in &report.failures {
        println!("warning: {} discovery failed: {}", failure.kind, failure.error);
    }

    Ok(())
}

async fn run_sweep(config: Config, asset: usize, to: String) -> Result<()> {
    let destination = parse_address(&to)?;
    let wallet = load_wallet()?;
    let client = chain_client(&config)?;

    let engine = DiscoveryEngine::new(
        client.clone(),
        config.registry(),
        config.claims_contract,
    );
    let report = engine.discover(wallet.address()).await;

    let position = report.positions.get(asset).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "no asset at index {} ({} discovered)",
            asset,
            report.positions.len()
        ))
    })?;

    let executor = SweepExecutor::new(client, config.claims_contract, config.relayer);
    let hash = executor.sweep(&wallet, position, destination).await?;

    println!("Sweep submitted: {}", hash);
    println!("https://etherscan.io/tx/{}", hash);

    Ok(())
}

async fn run_create_claims(
    config: Config,
    token: String,
    recipients_path: PathBuf,
    amount: String,
) -> Result<()> {
    let token = parse_address(&token)?;
    let quantity = amount
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("bad amount: {}", e)))?;

    let content = std::fs::read_to_string(&recipients_path)
        .map_err(|e| Error::Config(format!("{}: {}", recipients_path.display(), e)))?;
    let recipients = content
        .split_whitespace()
        .map(parse_address)
        .collect::<Result<Vec<_>>>()?;

    let wallet = load_wallet()?;
    let client = chain_client(&config)?;
    let builder = DepositBuilder::new(client, config.claims_contract);

    let outcome = builder
        .create_claims(&wallet, token, &recipients, quantity)
        .await?;

    println!("Approval: {}", outcome.approval);
    for (i, hash) in outcome.deposits.iter().enumerate() {
        println!("Deposit chunk {}: {}", i, hash);
    }
    if let Some(failure) = &outcome.failure {
        println!(
            "Chunk {} failed ({}); earlier chunks are already on-chain",
            failure.chunk, failure.error
        );
    }

    Ok(())
}

async fn run_withdraw(config: Config, index: u64, claim_id: String) -> Result<()> {
    let claim_id = claim_id
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("bad claim id: {}", e)))?;

    let wallet = load_wallet()?;
    let client = chain_client(&config)?;
    let redeemer = ClaimRedeemer::new(client, config.claims_contract, config.relayer);

    let hash = redeemer
        .withdraw(&wallet, alloy::primitives::U256::from(index), claim_id)
        .await?;

    println!("Withdraw submitted: {}", hash);

    Ok(())
}
