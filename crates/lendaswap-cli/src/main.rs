//! Lendaswap command line wallet

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use lendaswap::{ApiUrl, Network, SwapWalletBuilder};
use lendaswap_redb::WalletRedbDatabase;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod config;
mod sub_commands;

use crate::config::Settings;

const DEFAULT_WORK_DIR: &str = ".lendaswap-cli";

/// Command line wallet for Lendaswap swaps
#[derive(Parser)]
#[command(name = "lendaswap-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to working dir
    #[arg(short, long)]
    work_dir: Option<PathBuf>,
    /// Logging level
    #[arg(short, long, default_value = "error")]
    log_level: Level,
    /// Backend url, overrides the config file
    #[arg(long)]
    api_url: Option<ApiUrl>,
    /// Network, overrides the config file
    #[arg(short, long)]
    network: Option<Network>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or import the wallet seed
    Init(sub_commands::init::InitSubCommand),
    /// Print the mnemonic
    ShowSeed,
    /// Print the identity xpub and the next key index
    Xpub,
    /// Derive swap keys
    Derive(sub_commands::derive::DeriveSubCommand),
    /// Quote a swap
    Quote(sub_commands::quote::QuoteSubCommand),
    /// List tokens and tradable pairs
    Tokens,
    /// Swap BTC on Arkade to an EVM token
    SwapBtcToEvm(sub_commands::create_swap::BtcToEvmSubCommand),
    /// Swap an EVM token to BTC on Arkade
    SwapEvmToArkade(sub_commands::create_swap::EvmToArkadeSubCommand),
    /// Swap an EVM token to a lightning invoice
    SwapEvmToLightning(sub_commands::create_swap::EvmToLightningSubCommand),
    /// Refresh a swap from the backend
    Get(sub_commands::get::GetSubCommand),
    /// List stored swaps
    List,
    /// Claim a funded swap
    Claim(sub_commands::claim::ClaimSubCommand),
    /// Refund an expired swap
    Refund(sub_commands::claim::RefundSubCommand),
    /// Rebuild the swap history from the seed
    Recover,
    /// Delete a stored swap
    Delete(sub_commands::delete::DeleteSubCommand),
    /// Delete every stored swap
    Clear,
    /// Stream prices
    Prices(sub_commands::prices::PricesSubCommand),
    /// Backend version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let env_filter = EnvFilter::new(format!(
        "{},hyper=warn,rustls=warn,reqwest=warn,tungstenite=warn",
        default_filter
    ));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let work_dir = match &args.work_dir {
        Some(work_dir) => work_dir.clone(),
        None => {
            let home_dir = home::home_dir().ok_or(anyhow!("Unknown home dir"))?;
            home_dir.join(DEFAULT_WORK_DIR)
        }
    };

    fs::create_dir_all(&work_dir)?;

    let mut settings = Settings::new(&work_dir.join("config.toml"))?;
    if let Some(network) = args.network {
        settings.network = network;
    }
    let api_url = match args.api_url {
        Some(api_url) => api_url,
        None => ApiUrl::from_str(&settings.api_url)?,
    };

    let redb_path = work_dir.join("lendaswap.redb");
    let localstore = Arc::new(WalletRedbDatabase::new(&redb_path)?);

    let wallet = SwapWalletBuilder::new()
        .network(settings.network)
        .api_url(api_url.clone())
        .store(localstore)
        .referral_code(settings.referral_code.clone())
        .build()?;

    match &args.command {
        Commands::Init(sub_command_args) => {
            sub_commands::init::init(&wallet, sub_command_args).await
        }
        Commands::ShowSeed => sub_commands::init::show_seed(&wallet).await,
        Commands::Xpub => sub_commands::derive::xpub(&wallet).await,
        Commands::Derive(sub_command_args) => {
            sub_commands::derive::derive(&wallet, sub_command_args).await
        }
        Commands::Quote(sub_command_args) => {
            sub_commands::quote::quote(&wallet, sub_command_args).await
        }
        Commands::Tokens => sub_commands::quote::tokens(&wallet).await,
        Commands::SwapBtcToEvm(sub_command_args) => {
            sub_commands::create_swap::btc_to_evm(&wallet, sub_command_args).await
        }
        Commands::SwapEvmToArkade(sub_command_args) => {
            sub_commands::create_swap::evm_to_arkade(&wallet, sub_command_args).await
        }
        Commands::SwapEvmToLightning(sub_command_args) => {
            sub_commands::create_swap::evm_to_lightning(&wallet, sub_command_args).await
        }
        Commands::Get(sub_command_args) => sub_commands::get::get(&wallet, sub_command_args).await,
        Commands::List => sub_commands::get::list(&wallet).await,
        Commands::Claim(sub_command_args) => {
            sub_commands::claim::claim(&wallet, sub_command_args).await
        }
        Commands::Refund(sub_command_args) => {
            sub_commands::claim::refund(&wallet, sub_command_args).await
        }
        Commands::Recover => sub_commands::recover::recover(&wallet).await,
        Commands::Delete(sub_command_args) => {
            sub_commands::delete::delete(&wallet, sub_command_args).await
        }
        Commands::Clear => sub_commands::delete::clear(&wallet).await,
        Commands::Prices(sub_command_args) => {
            sub_commands::prices::prices(&api_url, sub_command_args).await
        }
        Commands::Version => sub_commands::quote::version(&wallet).await,
    }
}
