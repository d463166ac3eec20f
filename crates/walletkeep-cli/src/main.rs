//! walletkeep: sr25519 wallet manager.
//!
//! Creates, imports and exports wallets whose mnemonic and secret key
//! are sealed under the user's password in `<data_dir>/wallets.json`.

mod commands;
mod config;
mod login;
mod output;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{CliConfig, Overrides};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// walletkeep: sr25519 wallets sealed under a password.
#[derive(Parser)]
#[command(name = "walletkeep", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Load settings from a JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (default: platform-specific).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// SS58 network prefix for addresses.
    #[arg(long, global = true)]
    ss58_prefix: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a mnemonic and show its address (nothing is stored).
    Generate {
        /// Number of words (12, 15, 18, 21 or 24).
        #[arg(long)]
        words: Option<usize>,
    },
    /// Decode an SS58 address.
    Inspect {
        /// Address to decode.
        address: String,
    },
    /// Create a wallet from a new or supplied mnemonic.
    Create {
        /// Unique wallet name.
        #[arg(long)]
        name: String,
        /// Address type label (default from config).
        #[arg(long)]
        address_type: Option<String>,
        /// Read the mnemonic from this file instead of generating one.
        #[arg(long)]
        mnemonic_file: Option<PathBuf>,
    },
    /// Import a wallet from a JSON file.
    Import {
        /// Unique wallet name.
        #[arg(long)]
        name: String,
        /// JSON file with `mnemonic_phrase`.
        #[arg(long)]
        file: PathBuf,
        /// Address type label (default from config).
        #[arg(long)]
        address_type: Option<String>,
    },
    /// Decrypt a wallet to an export file.
    Export {
        /// Wallet name.
        #[arg(long)]
        name: String,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub config: CliConfig,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = match resolve_config(&cli) {
        Ok(config) => dispatch(GlobalOpts { json, config }, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&e, json);
        std::process::exit(1);
    }
}

fn resolve_config(cli: &Cli) -> std::result::Result<CliConfig, String> {
    let base = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    base.merge(&Overrides {
        data_dir: cli.data_dir.clone(),
        ss58_prefix: cli.ss58_prefix,
    })
}

async fn dispatch(opts: GlobalOpts, cmd: Commands) -> std::result::Result<(), String> {
    match cmd {
        Commands::Generate { words } => commands::keys::generate(words, &opts).await,
        Commands::Inspect { address } => commands::keys::inspect(&address, &opts),
        Commands::Create {
            name,
            address_type,
            mnemonic_file,
        } => {
            commands::wallet::create(
                &name,
                address_type.as_deref(),
                mnemonic_file.as_deref(),
                &opts,
            )
            .await
        }
        Commands::Import {
            name,
            file,
            address_type,
        } => commands::wallet::import(&name, &file, address_type.as_deref(), &opts).await,
        Commands::Export { name, out } => {
            commands::wallet::export(&name, out.as_deref(), &opts).await
        }
    }
}
