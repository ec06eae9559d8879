//! Reward-Share Node CLI Application
//!
//! Runs the account API server and offers offline key utilities.

use clap::{Parser, Subcommand};
use reward_share_node::cli::{self, SettingsOverrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reward-share-node")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Account and reward-share API node", long_about = None)]
struct Cli {
    /// Data directory for repository storage
    #[arg(short, long, default_value = ".node_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// JSON settings file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Refuse non-production endpoints
        #[arg(long)]
        restricted: bool,

        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert a Base58 public key to an address
    Convert {
        /// Base58 public key
        public_key: String,
    },

    /// Check whether an address is valid
    Validate {
        /// Address to check
        address: String,
    },

    /// Derive a reward-share key
    RewardShareKey {
        /// Minter's Base58 private key
        #[arg(long)]
        private_key: String,

        /// Recipient's Base58 public key
        #[arg(long)]
        public_key: String,
    },

    /// Generate a new account
    Generate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            settings,
            restricted,
            bind,
            port,
        } => {
            let overrides = SettingsOverrides {
                restricted,
                bind,
                port,
            };
            let settings = cli::load_settings(settings.as_deref(), &overrides)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cli::cmd_serve(&cli.data_dir, settings))?;
        }
        Commands::Convert { public_key } => cli::cmd_convert(&public_key)?,
        Commands::Validate { address } => cli::cmd_validate(&address)?,
        Commands::RewardShareKey {
            private_key,
            public_key,
        } => cli::cmd_reward_share_key(&private_key, &public_key)?,
        Commands::Generate => cli::cmd_generate()?,
    }

    Ok(())
}
