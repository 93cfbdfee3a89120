//! CLI tool to run individual forced withdrawal stages.
//!
//! - `delay-policy`: Read the sequencer inbox delay
//! - `collapse-delay`: Collapse the delay to one block if it is above that
//! - `extract --tx <HASH>`: Decode the delayed message of a withdrawal receipt
//! - `force-include --tx <HASH>`: Gate and force include an earlier withdrawal
//! - `predict-hash <NONCE> <VALUE> <ADDRESS>`: Predict the L2 transaction hash

use action::{
    collapse_delay_if_needed, fetch_withdrawal_receipt, read_delay_policy, TokioClock,
};
use alloy_primitives::B256;
use balance::{BalanceOracle, ExplorerBalanceOracle, RpcBalanceOracle};
use clap::{Parser, Subcommand};
use client::L1Chain;
use orchestrator::{config::Config, Orchestrator};
use serde::Serialize;
use tracing::info;
use withdrawal::{extract_delayed_message, WithdrawalInput};

#[derive(Parser)]
#[command(name = "step")]
#[command(about = "Run individual forced withdrawal stages")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: String,

    /// Last L2 block before the fork, overrides the configuration file
    #[arg(long, env = "L2_FORK_BLOCK")]
    l2_fork_block: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read the sequencer inbox delay policy
    DelayPolicy,

    /// Collapse the sequencer inbox delay if it is above one block
    CollapseDelay,

    /// Decode the delayed message created by a withdrawal transaction
    Extract {
        /// Hash of the `sendWithdrawEthToFork` transaction
        #[arg(long)]
        tx: B256,
    },

    /// Wait for the inclusion threshold and force include a withdrawal
    ForceInclude {
        /// Hash of the `sendWithdrawEthToFork` transaction
        #[arg(long)]
        tx: B256,
    },

    /// Predict the L2 transaction hash of a withdrawal
    PredictHash {
        nonce: String,
        value: String,
        address: String,
    },
}

fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)?;
    if cli.l2_fork_block.is_some() {
        config.l2_fork_block = cli.l2_fork_block;
    }

    match config.l2_rpc_url.clone() {
        Some(url) => {
            let oracle = RpcBalanceOracle::new(client::create_provider(&url)?);
            run_step(&cli, &config, oracle).await
        }
        None => {
            let oracle = ExplorerBalanceOracle::new(
                config.explorer_api_url.clone(),
                config.explorer_api_key.clone(),
            );
            run_step(&cli, &config, oracle).await
        }
    }
}

async fn run_step<O: BalanceOracle>(cli: &Cli, config: &Config, oracle: O) -> eyre::Result<()> {
    let chain =
        client::connect_chain(&config.l1_rpc_url, &cli.private_key, config.contracts())?;
    let orchestrator = Orchestrator::new(chain.clone(), oracle, TokioClock, config.settings());

    match &cli.command {
        Command::DelayPolicy => {
            info!("Running: delay-policy");

            let policy = read_delay_policy(&chain).await?;
            print_json(&policy)?;
        }
        Command::CollapseDelay => {
            info!("Running: collapse-delay");

            orchestrator.guard_chain().await?;
            let policy = read_delay_policy(&chain).await?;

            match collapse_delay_if_needed(&chain, policy).await? {
                Some(receipt) => {
                    info!(tx_hash = %receipt.transaction_hash, "Delay collapsed");
                }
                None => {
                    info!(delay_blocks = policy.delay_blocks, "No collapse needed");
                }
            }
        }
        Command::Extract { tx } => {
            info!(tx_hash = %tx, "Running: extract");

            let receipt = fetch_withdrawal_receipt(&chain, *tx).await?;
            let message = extract_delayed_message(&receipt)?;
            print_json(&message)?;
        }
        Command::ForceInclude { tx } => {
            info!(tx_hash = %tx, "Running: force-include");

            let resumed = orchestrator.resume(*tx).await?;
            print_json(&resumed)?;
        }
        Command::PredictHash {
            nonce,
            value,
            address,
        } => {
            info!("Running: predict-hash");

            let input = WithdrawalInput::new(nonce, value, address);
            let request = orchestrator.resolve_request(&input).await?;
            let hash = orchestrator.predict_hash(&request);

            info!(sender = %chain.signer(), "Predicted with the signer as L2 sender");
            println!("{hash}");
        }
    }

    info!("Step completed");
    Ok(())
}
